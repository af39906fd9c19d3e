// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{BufRead, Write};

use tlgate::app_config::{Config, LogLevel};
use tlgate::translation::classifiers::{
    contains_source_script, has_excessive_repetition_with, is_expressive_repetition,
    is_mostly_untranslatable, ScriptCounts,
};
use tlgate::translation::source::SourceText;
use tlgate::translation::Validator;
use tlgate::TranslationService;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text, or every line of stdin when no text is given
    Translate {
        /// Japanese text to translate
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// Number of stdin lines translated concurrently
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Check that the generation server is reachable
    Check,

    /// Show classifier judgments for a text and validate an optional candidate
    Classify {
        /// Japanese source text
        #[arg(value_name = "TEXT")]
        text: String,

        /// Candidate translation to validate against the source
        #[arg(short = 'C', long)]
        candidate: Option<String>,
    },

    /// Generate shell completions for tlgate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// tlgate - quality gate for LLM Japanese-to-Chinese translation
#[derive(Parser, Debug)]
#[command(name = "tlgate")]
#[command(version)]
#[command(about = "Quality gate and adaptive retry for LLM Japanese-to-Chinese translation")]
#[command(long_about = "tlgate sends Japanese text to an OpenAI-compatible translation server, \
validates every candidate and retries with adjusted sampling until one passes.

EXAMPLES:
    tlgate translate 「おはよう」                 # Translate one line
    cat script.txt | tlgate translate -j 8      # Translate stdin, 8 lines at a time
    tlgate classify 新規                         # Show classifier judgments
    tlgate check                                # Test the server connection
    tlgate completions bash > tlgate.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Translation server URL
    #[arg(short, long, global = true, env = "TLGATE_ENDPOINT")]
    endpoint: Option<String>,

    /// Model name to use for translation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info level; the config file or --log-level may change it
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "tlgate", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    let config = load_config(&cli)?;

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    match cli.command {
        Commands::Translate { text, concurrency } => {
            let service = TranslationService::from_config(&config)?;
            match text {
                Some(text) => run_translate_one(&service, &text).await,
                None => {
                    let concurrency = concurrency.unwrap_or(config.provider.concurrent_requests);
                    run_translate_stdin(&service, concurrency).await
                }
            }
        }
        Commands::Check => run_check(&config).await,
        Commands::Classify { text, candidate } => {
            run_classify(&config, &text, candidate.as_deref())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration file and apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(endpoint) = &cli.endpoint {
        config.provider.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_translate_one(service: &TranslationService, text: &str) -> Result<()> {
    let (translated, ok) = service.translate(text).await;
    println!("{}", translated);

    if ok {
        Ok(())
    } else {
        Err(anyhow!("Translation failed"))
    }
}

async fn run_translate_stdin(service: &TranslationService, concurrency: usize) -> Result<()> {
    let lines = std::io::stdin()
        .lock()
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .context("Failed to read from stdin")?;

    let progress_bar = ProgressBar::new(lines.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} lines ({percent}%) {msg} {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));

    let results = service
        .translate_batch(&lines, concurrency, Some(&progress_bar))
        .await;
    progress_bar.finish_and_clear();

    let failed = results.iter().filter(|(_, ok)| !ok).count();
    let mut stdout = std::io::stdout().lock();
    for (translated, _) in &results {
        writeln!(stdout, "{}", translated)?;
    }

    info!("Translated {} lines, {} failed", results.len(), failed);
    Ok(())
}

async fn run_check(config: &Config) -> Result<()> {
    let service = TranslationService::from_config(config)?;
    info!(
        "Testing connection to {} with model {}",
        config.provider.endpoint, config.provider.model
    );

    match service.test_connection().await {
        Ok(()) => {
            info!("Successfully connected to {}", config.provider.endpoint);
            Ok(())
        }
        Err(e) => {
            error!("Failed to connect to {}: {}", config.provider.endpoint, e);
            Err(anyhow!("Connection check failed: {}", e))
        }
    }
}

fn run_classify(config: &Config, text: &str, candidate: Option<&str>) -> Result<()> {
    let service = TranslationService::from_config(config)?;
    let engine = service.config();
    let source = SourceText::new(text);
    let counts = ScriptCounts::of(source.working());

    println!("working text:            {}", source.working());
    println!("quoted:                  {}", source.is_quoted());
    println!("contains kana:           {}", contains_source_script(source.working()));
    println!("kana ratio:              {:.2}", counts.kana_ratio());
    println!("mostly untranslatable:   {}", is_mostly_untranslatable(source.working()));
    println!("expressive repetition:   {}", is_expressive_repetition(source.original()));
    println!(
        "source repetition:       {}",
        has_excessive_repetition_with(source.working(), engine.repeat_count, engine.cjk_repeat_tolerance)
    );
    println!("skipped:                 {}", service.should_skip(&source));

    if let Some(candidate) = candidate {
        println!(
            "candidate repetition:    {}",
            has_excessive_repetition_with(candidate, engine.repeat_count, engine.cjk_repeat_tolerance)
        );
        let outcome = Validator::new(engine).validate(candidate, source.working(), Some(source.original()));
        println!("candidate verdict:       {}", outcome.reason);
    }
    Ok(())
}
