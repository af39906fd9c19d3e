use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::translation::params::GenerationParameters;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Generation service connection
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Quality-control engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Connection settings for the OpenAI-compatible server
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key, sent as a bearer token when non-empty
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Max concurrent requests in batch mode
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Settings of the quality-control engine
///
/// Immutable once a `TranslationService` has been built from it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Instruction sent as the system message of every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Parameters of the first attempt of every request
    #[serde(default)]
    pub default_params: GenerationParameters,

    /// Repetition threshold for candidates
    #[serde(default = "default_repeat_count")]
    pub repeat_count: usize,

    /// Extra repetitions allowed for single CJK ideographs
    #[serde(default = "default_cjk_repeat_tolerance")]
    pub cjk_repeat_tolerance: usize,

    /// Maximum number of attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause after a transport failure
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Timeout of a single generation call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Slack added to the per-call timeout for the overall request deadline
    #[serde(default = "default_deadline_margin_secs")]
    pub deadline_margin_secs: u64,

    /// Sources up to this many characters count as short
    #[serde(default = "default_short_source_max_len")]
    pub short_source_max_len: usize,

    /// Maximum output/source length ratio for short sources
    #[serde(default = "default_too_long_ratio")]
    pub too_long_ratio: usize,

    /// Phrases that mark a refusal
    #[serde(default = "default_apology_phrases")]
    pub apology_phrases: Vec<String>,

    /// Fragments of the system prompt that must not appear in a translation
    #[serde(default = "default_prompt_echo_phrases")]
    pub prompt_echo_phrases: Vec<String>,

    /// Training-template fragments at which model output is cut
    #[serde(default = "default_leakage_markers")]
    pub leakage_markers: Vec<String>,

    /// Prefix of the returned text when every attempt failed
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,

    /// Prefix of the returned text when the request deadline expired
    #[serde(default = "default_timeout_marker")]
    pub timeout_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            default_params: GenerationParameters::default(),
            repeat_count: default_repeat_count(),
            cjk_repeat_tolerance: default_cjk_repeat_tolerance(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            deadline_margin_secs: default_deadline_margin_secs(),
            short_source_max_len: default_short_source_max_len(),
            too_long_ratio: default_too_long_ratio(),
            apology_phrases: default_apology_phrases(),
            prompt_echo_phrases: default_prompt_echo_phrases(),
            leakage_markers: default_leakage_markers(),
            failure_marker: default_failure_marker(),
            timeout_marker: default_timeout_marker(),
        }
    }
}

impl EngineConfig {
    /// Timeout of a single generation call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Overall deadline of one `translate` call
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs + self.deadline_margin_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_model() -> String {
    "GalTransl-v4-4B-2601".to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_system_prompt() -> String {
    "你是一个视觉小说翻译模型，可以通顺地使用给定的术语表以指定的风格将日文翻译成简体中文，\
     并联系上下文正确使用人称代词，注意不要混淆使役态和被动态的主语和宾语，\
     不要擅自添加原文中没有的特殊符号，也不要擅自增加或减少换行。"
        .to_string()
}

fn default_repeat_count() -> usize {
    8
}

fn default_cjk_repeat_tolerance() -> usize {
    crate::translation::classifiers::DEFAULT_CJK_REPEAT_TOLERANCE
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second fixed pause after a transport failure
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_deadline_margin_secs() -> u64 {
    5
}

fn default_short_source_max_len() -> usize {
    10
}

fn default_too_long_ratio() -> usize {
    5
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_apology_phrases() -> Vec<String> {
    to_strings(&[
        "我很抱歉",
        "抱歉，我无法",
        "抱歉，您提供的内容",
        "请提供需要翻译的",
        "请告诉我您需要翻译的",
    ])
}

fn default_prompt_echo_phrases() -> Vec<String> {
    to_strings(&[
        "视觉小说翻译模型",
        "流畅地将日文翻译成",
        "联系上下文正确使用人称代词",
        "不要混淆使役态和被动态",
        "不要擅自添加原文中没有的",
    ])
}

fn default_leakage_markers() -> Vec<String> {
    to_strings(&[
        "参考以下术语表",
        "根据以上术语表",
        "将下面的文本从日文翻译成",
        "请将以下日文翻译成",
        "翻译成简体中文",
        "历史翻译：",
        "src->dst",
    ])
}

fn default_failure_marker() -> String {
    "[翻译失败] ".to_string()
}

fn default_timeout_marker() -> String {
    "[请求超时] ".to_string()
}

impl Config {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load a configuration file, writing the defaults to it when it does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.provider.endpoint.trim();
        if endpoint.is_empty() {
            return Err(anyhow!("Provider endpoint cannot be empty"));
        }
        let url = Url::parse(endpoint)
            .with_context(|| format!("Invalid provider endpoint: {}", endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("Provider endpoint must use http or https: {}", endpoint));
        }

        if self.provider.model.trim().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }
        if self.provider.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }

        let engine = &self.engine;
        if engine.max_retries == 0 {
            return Err(anyhow!("max_retries must be at least 1"));
        }
        if engine.repeat_count < 2 {
            return Err(anyhow!("repeat_count must be at least 2, got {}", engine.repeat_count));
        }
        if engine.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }

        let params = &engine.default_params;
        if !(0.0..=2.0).contains(&params.temperature) {
            return Err(anyhow!("temperature must be within [0, 2], got {}", params.temperature));
        }
        if !(params.top_p > 0.0 && params.top_p <= 1.0) {
            return Err(anyhow!("top_p must be within (0, 1], got {}", params.top_p));
        }

        Ok(())
    }
}
