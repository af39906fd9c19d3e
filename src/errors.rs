/*!
 * Error types for the tlgate engine.
 *
 * Transport failures come from the provider layer as `ProviderError`.
 * Every way a single translation attempt can go wrong, whether the
 * transport failed or the candidate was rejected, is a `TranslationError`.
 * None of these ever reach the caller of `TranslationService::translate`;
 * they are recorded per attempt and recovered inside the retry loop.
 */

use thiserror::Error;

/// Errors that can occur when calling the generation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The service could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

impl ProviderError {
    /// Whether this failure was a timeout rather than some other request error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Failure of a single translation attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The model returned nothing
    #[error("Translation result is empty")]
    EmptyOutput,

    /// The model returned the source text unchanged
    #[error("Model echoed the source text")]
    EchoOutput,

    /// The output contains fragments of the instruction template
    #[error("Model echoed the system prompt")]
    PromptLeakage,

    /// The output is disproportionately long for a short source
    #[error("Translation is too long, likely contains unrelated content")]
    ExcessiveLength,

    /// The model refused to translate
    #[error("Model refused to translate")]
    Refusal,

    /// The output still contains kana
    #[error("Translation contains untranslated Japanese")]
    UntranslatedRemnant,

    /// The output degenerated into repetition
    #[error("Translation contains excessive repetition")]
    ExcessiveRepetition,

    /// The generation call timed out
    #[error("Generation request timed out: {0}")]
    TransportTimeout(String),

    /// The generation call failed for any other reason
    #[error("Generation request failed: {0}")]
    TransportError(String),
}

impl TranslationError {
    /// Whether this error came from the transport rather than from validation
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportTimeout(_) | Self::TransportError(_))
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Timeout(message) => Self::TransportTimeout(message),
            other => Self::TransportError(other.to_string()),
        }
    }
}
