/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which drives one request
 * through the skip gate, the bounded retry loop and reconciliation, and
 * renders the final result for the caller.
 */

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::app_config::{Config, EngineConfig};
use crate::errors::ProviderError;
use crate::providers::openai::OpenAI;
use crate::providers::Provider;

use super::classifiers::is_mostly_untranslatable;
use super::cleanup::clean_candidate;
use super::reconcile::reconcile;
use super::retry::{AttemptEvent, RetryPhase, RetryState};
use super::source::{escape_newlines, unescape_newlines, SourceText};
use super::validator::Validator;

/// How a request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalResult {
    /// A candidate passed validation
    Translated(String),
    /// The source needed no translation and is returned as is
    Skipped(String),
    /// Every attempt was rejected; the last candidate is returned anyway
    Degraded(String),
    /// No usable candidate was produced
    Failed,
    /// The overall request deadline expired
    TimedOut,
}

impl FinalResult {
    /// Whether the caller receives usable text
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed | Self::TimedOut)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Translated(text) | Self::Skipped(text) | Self::Degraded(text) => Some(text),
            Self::Failed | Self::TimedOut => None,
        }
    }

    /// Short name for logs and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Translated(_) => "translated",
            Self::Skipped(_) => "skipped",
            Self::Degraded(_) => "degraded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// Main translation service
///
/// Holds only immutable configuration and a shared provider, so clones are
/// cheap and requests may run concurrently.
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn Provider>,
    config: Arc<EngineConfig>,
}

impl TranslationService {
    /// Create a new translation service over the given provider
    pub fn new(provider: Arc<dyn Provider>, config: EngineConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// Create a service talking to the configured OpenAI-compatible server
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let api_key = Some(config.provider.api_key.clone());
        let client = OpenAI::new(
            config.provider.endpoint.clone(),
            config.provider.model.clone(),
            api_key,
            config.engine.request_timeout(),
        );

        Ok(Self::new(Arc::new(client), config.engine.clone()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Test the connection to the generation service
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }

    /// Whether the source can be returned without calling the model
    ///
    /// Short snippets with no real kana content (names, kanji compounds,
    /// symbols) are passed through unchanged.
    pub fn should_skip(&self, source: &SourceText) -> bool {
        source.working_len() <= self.config.short_source_max_len
            && is_mostly_untranslatable(source.working())
    }

    /// Translate one text
    ///
    /// Never fails: on failure the returned string is the failure or timeout
    /// marker followed by the input, and the flag is `false`.
    pub async fn translate(&self, text: &str) -> (String, bool) {
        let result = self.translate_with_deadline(text).await;
        self.render(text, result)
    }

    /// Run the engine on one text under the overall request deadline
    ///
    /// Line breaks are escaped before the engine runs and restored in the
    /// returned text.
    pub async fn translate_with_deadline(&self, text: &str) -> FinalResult {
        let escaped = escape_newlines(text);
        let deadline = self.config.request_deadline();

        match tokio::time::timeout(deadline, self.process(&escaped)).await {
            Ok(FinalResult::Translated(t)) => FinalResult::Translated(unescape_newlines(&t)),
            Ok(FinalResult::Skipped(t)) => FinalResult::Skipped(unescape_newlines(&t)),
            Ok(FinalResult::Degraded(t)) => FinalResult::Degraded(unescape_newlines(&t)),
            Ok(other) => other,
            Err(_) => {
                error!("Request deadline of {:?} expired", deadline);
                FinalResult::TimedOut
            }
        }
    }

    /// Translate many texts concurrently, keeping input order
    pub async fn translate_batch(
        &self,
        texts: &[String],
        concurrency: usize,
        progress: Option<&ProgressBar>,
    ) -> Vec<(String, bool)> {
        stream::iter(texts.iter())
            .map(|text| async move {
                let result = self.translate(text).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                result
            })
            .buffered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await
    }

    /// Run the skip gate, the retry loop and reconciliation on one text
    pub async fn process(&self, text: &str) -> FinalResult {
        let source = SourceText::new(text);

        if self.should_skip(&source) {
            info!("Skipping translation of untranslatable text: {}", source.original());
            return FinalResult::Skipped(source.original().to_string());
        }

        let validator = Validator::new(&self.config);
        let mut state = RetryState::new(self.config.default_params, self.config.max_retries);

        while state.phase() == RetryPhase::Attempting {
            let attempt = state.attempt() + 1;
            let max = state.max_retries();
            let params = *state.params();
            debug!(
                "Attempt {}/{}: temperature={:.2}, frequency_penalty={:.2}",
                attempt, max, params.temperature, params.frequency_penalty
            );

            let event = match self
                .provider
                .generate(&self.config.system_prompt, source.working(), &params)
                .await
            {
                Ok(raw) => {
                    let candidate = clean_candidate(&raw, &self.config.leakage_markers);
                    let outcome =
                        validator.validate(&candidate, source.working(), Some(source.original()));
                    if !outcome.is_valid {
                        warn!(
                            "Validation failed ({}/{}): {} - {}",
                            attempt, max, outcome.reason, candidate
                        );
                    }
                    AttemptEvent::Validated { candidate, outcome }
                }
                Err(e) => {
                    error!("Request failed ({}/{}): {}", attempt, max, e);
                    AttemptEvent::TransportFailed(e.into())
                }
            };

            let transport_failed = matches!(event, AttemptEvent::TransportFailed(_));
            state = state.transition(event);

            if transport_failed && state.phase() == RetryPhase::Attempting {
                tokio::time::sleep(self.config.retry_backoff()).await;
            }
        }

        let result = match state.phase() {
            RetryPhase::Succeeded => {
                let text = reconcile(source.original(), state.last_candidate());
                info!("Translated: {} -> {}", source.original(), text);
                FinalResult::Translated(text)
            }
            RetryPhase::DegradedOutput => {
                let text = reconcile(source.original(), state.last_candidate());
                let last_reason = state
                    .last_outcome()
                    .map_or("transport", |outcome| outcome.reason.as_str());
                warn!(
                    "Retries exhausted (last: {}), using last candidate: {} ({})",
                    last_reason,
                    text,
                    state.error_summary()
                );
                FinalResult::Degraded(text)
            }
            RetryPhase::ExhaustedFailed | RetryPhase::Attempting => {
                error!(
                    "Translation failed: {} ({})",
                    source.original(),
                    state.error_summary()
                );
                FinalResult::Failed
            }
        };

        debug!(
            "Finished after {} failed attempts: {}",
            state.attempt(),
            result.label()
        );
        result
    }

    /// Turn a final result into the caller-facing pair
    fn render(&self, original: &str, result: FinalResult) -> (String, bool) {
        match result {
            FinalResult::Translated(text)
            | FinalResult::Skipped(text)
            | FinalResult::Degraded(text) => (text, true),
            FinalResult::Failed => (format!("{}{}", self.config.failure_marker, original), false),
            FinalResult::TimedOut => (format!("{}{}", self.config.timeout_marker, original), false),
        }
    }
}
