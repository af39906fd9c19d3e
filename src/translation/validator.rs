/*!
 * Candidate translation validation.
 *
 * Runs a fixed sequence of checks against one candidate and reports the
 * first one that fails. The order matters: an empty candidate is reported as
 * `empty` even if it would also match a refusal phrase, and an echo of
 * kanji-only source is accepted before any other check runs.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::EngineConfig;
use crate::errors::TranslationError;

use super::classifiers::{
    contains_source_script, has_excessive_repetition_with, is_expressive_repetition,
    is_mostly_untranslatable,
};

/// Reason code attached to every validation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    Ok,
    Empty,
    Echo,
    PromptEcho,
    TooLong,
    Apology,
    Japanese,
    Repeat,
}

impl ValidationReason {
    /// Short machine-readable code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Empty => "empty",
            Self::Echo => "echo",
            Self::PromptEcho => "prompt_echo",
            Self::TooLong => "too_long",
            Self::Apology => "apology",
            Self::Japanese => "japanese",
            Self::Repeat => "repeat",
        }
    }

    /// The attempt error this reason represents, `None` for `Ok`
    pub fn to_error(self) -> Option<TranslationError> {
        match self {
            Self::Ok => None,
            Self::Empty => Some(TranslationError::EmptyOutput),
            Self::Echo => Some(TranslationError::EchoOutput),
            Self::PromptEcho => Some(TranslationError::PromptLeakage),
            Self::TooLong => Some(TranslationError::ExcessiveLength),
            Self::Apology => Some(TranslationError::Refusal),
            Self::Japanese => Some(TranslationError::UntranslatedRemnant),
            Self::Repeat => Some(TranslationError::ExcessiveRepetition),
        }
    }
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of validating one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub reason: ValidationReason,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            reason: ValidationReason::Ok,
        }
    }

    pub fn failed(reason: ValidationReason) -> Self {
        Self {
            is_valid: false,
            reason,
        }
    }
}

/// Validator bound to an engine configuration
pub struct Validator<'a> {
    config: &'a EngineConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Validate a candidate translation
    ///
    /// # Arguments
    /// * `candidate` - Cleaned model output
    /// * `working_text` - Source text as sent to the model (quotes stripped)
    /// * `original_text` - Source text as received, used for the expressive check
    pub fn validate(
        &self,
        candidate: &str,
        working_text: &str,
        original_text: Option<&str>,
    ) -> ValidationOutcome {
        if candidate.trim().is_empty() {
            return ValidationOutcome::failed(ValidationReason::Empty);
        }

        if candidate.trim() == working_text.trim() {
            if is_mostly_untranslatable(working_text) {
                return ValidationOutcome::ok();
            }
            return ValidationOutcome::failed(ValidationReason::Echo);
        }

        if contains_any(candidate, &self.config.prompt_echo_phrases) {
            return ValidationOutcome::failed(ValidationReason::PromptEcho);
        }

        let source_len = working_text.chars().count();
        if source_len <= self.config.short_source_max_len
            && candidate.chars().count() > source_len.saturating_mul(self.config.too_long_ratio)
        {
            return ValidationOutcome::failed(ValidationReason::TooLong);
        }

        if contains_any(candidate, &self.config.apology_phrases) {
            return ValidationOutcome::failed(ValidationReason::Apology);
        }

        if contains_source_script(candidate) {
            return ValidationOutcome::failed(ValidationReason::Japanese);
        }

        let expressive_source = original_text
            .filter(|text| !text.is_empty())
            .unwrap_or(working_text);
        if !is_expressive_repetition(expressive_source)
            && has_excessive_repetition_with(
                candidate,
                self.config.repeat_count,
                self.config.cjk_repeat_tolerance,
            )
        {
            return ValidationOutcome::failed(ValidationReason::Repeat);
        }

        ValidationOutcome::ok()
    }
}

fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .any(|phrase| !phrase.is_empty() && text.contains(phrase.as_str()))
}
