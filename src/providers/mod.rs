/*!
 * Provider implementations for text generation services.
 *
 * This module contains the client side of the engine:
 * - OpenAI: any OpenAI-compatible chat completion server
 * - Mock: scripted provider used by tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::translation::params::GenerationParameters;

/// Common trait for all generation providers
///
/// One call sends a single system instruction and a single user message and
/// returns the raw generated text, before any cleanup.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Generate a completion for the given text
    ///
    /// # Arguments
    /// * `system_prompt` - Fixed instruction sent as the system message
    /// * `user_text` - Text to translate, sent as the user message
    /// * `params` - Sampling parameters for this attempt
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw generated text or an error
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        params: &GenerationParameters,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

pub mod mock;
pub mod openai;
