/*!
 * Bounded retry state machine.
 *
 * `RetryState::transition` is a pure function from the current state and
 * the outcome of one attempt to the next state. It never performs I/O; the
 * service drives it by calling the provider, cleaning and validating the
 * output, and feeding the result back in as an `AttemptEvent`.
 */

use crate::errors::TranslationError;

use super::params::{adjust_parameters, GenerationParameters};
use super::validator::ValidationOutcome;

/// Phase of the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// More attempts are allowed
    Attempting,
    /// A candidate passed validation
    Succeeded,
    /// Attempts ran out but a non-empty candidate exists
    DegradedOutput,
    /// Attempts ran out without any usable candidate
    ExhaustedFailed,
}

impl RetryPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting)
    }
}

/// Result of one attempt, as seen by the state machine
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    /// The generation call failed before producing any text
    TransportFailed(TranslationError),
    /// The generation call returned text, which was cleaned and validated
    Validated {
        candidate: String,
        outcome: ValidationOutcome,
    },
}

/// Request-scoped state of the retry loop
#[derive(Debug, Clone)]
pub struct RetryState {
    phase: RetryPhase,
    attempt: u32,
    max_retries: u32,
    last_candidate: String,
    last_outcome: Option<ValidationOutcome>,
    params: GenerationParameters,
    errors: Vec<TranslationError>,
}

impl RetryState {
    /// Start a loop with the given parameters and attempt budget
    pub fn new(params: GenerationParameters, max_retries: u32) -> Self {
        let phase = if max_retries == 0 {
            RetryPhase::ExhaustedFailed
        } else {
            RetryPhase::Attempting
        };
        Self {
            phase,
            attempt: 0,
            max_retries,
            last_candidate: String::new(),
            last_outcome: None,
            params,
            errors: Vec::new(),
        }
    }

    /// Apply the outcome of one attempt
    ///
    /// Events received after the loop has settled are ignored.
    pub fn transition(mut self, event: AttemptEvent) -> Self {
        if self.phase.is_terminal() {
            return self;
        }

        match event {
            AttemptEvent::TransportFailed(error) => {
                self.errors.push(error);
                self.attempt += 1;
            }
            AttemptEvent::Validated { candidate, outcome } => {
                if !candidate.trim().is_empty() {
                    self.last_candidate = candidate;
                }
                self.last_outcome = Some(outcome);

                if outcome.is_valid {
                    self.phase = RetryPhase::Succeeded;
                    return self;
                }

                if let Some(error) = outcome.reason.to_error() {
                    self.errors.push(error);
                }
                self.params = adjust_parameters(outcome.reason, &self.params);
                self.attempt += 1;
            }
        }

        if self.attempt >= self.max_retries {
            self.phase = if self.last_candidate.is_empty() {
                RetryPhase::ExhaustedFailed
            } else {
                RetryPhase::DegradedOutput
            };
        }

        self
    }

    pub fn phase(&self) -> RetryPhase {
        self.phase
    }

    /// Number of failed attempts so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Parameters for the next generation call
    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    /// Most recent non-empty candidate returned by the model
    pub fn last_candidate(&self) -> &str {
        &self.last_candidate
    }

    /// Validation outcome of the most recent successful transport call
    pub fn last_outcome(&self) -> Option<ValidationOutcome> {
        self.last_outcome
    }

    /// Every attempt failure recorded so far, oldest first
    pub fn errors(&self) -> &[TranslationError] {
        &self.errors
    }

    /// Get summary of errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "No errors".to_string();
        }

        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        format!(
            "{} failed attempts of {}: {}",
            self.errors.len(),
            self.max_retries,
            parts.join("; ")
        )
    }
}
