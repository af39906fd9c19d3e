/*!
 * Generation parameters and the retry adjustment policy.
 */

use serde::{Deserialize, Serialize};

use super::validator::ValidationReason;

const TEMPERATURE_FLOOR: f32 = 0.1;
const TEMPERATURE_CEILING: f32 = 0.5;
const FREQUENCY_PENALTY_CEILING: f32 = 1.0;

/// Sampling controls sent with each generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Penalty applied to already generated tokens
    #[serde(default)]
    pub frequency_penalty: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            frequency_penalty: 0.0,
        }
    }
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_top_p() -> f32 {
    0.8
}

/// Parameters to use for the next attempt after a failed validation
///
/// - `repeat`: more frequency penalty, less randomness
/// - `apology`: more randomness to break out of the refusal
/// - `echo`: slightly more randomness
/// - `too_long`: less randomness
///
/// Every other reason retries with the same parameters. Limits are absolute,
/// so repeated adjustment saturates.
pub fn adjust_parameters(reason: ValidationReason, params: &GenerationParameters) -> GenerationParameters {
    let mut next = *params;
    match reason {
        ValidationReason::Repeat => {
            next.frequency_penalty = (next.frequency_penalty + 0.1).min(FREQUENCY_PENALTY_CEILING);
            next.temperature = (next.temperature - 0.05).max(TEMPERATURE_FLOOR);
        }
        ValidationReason::Apology => {
            next.temperature = (next.temperature + 0.1).min(TEMPERATURE_CEILING);
        }
        ValidationReason::Echo => {
            next.temperature = (next.temperature + 0.05).min(TEMPERATURE_CEILING);
        }
        ValidationReason::TooLong => {
            next.temperature = (next.temperature - 0.05).max(TEMPERATURE_FLOOR);
        }
        ValidationReason::Ok
        | ValidationReason::Empty
        | ValidationReason::Japanese
        | ValidationReason::PromptEcho => {}
    }
    next
}
