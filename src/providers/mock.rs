/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different model behaviors:
 * - `MockProvider::working()` - Always returns a Chinese translation
 * - `MockProvider::echo()` - Returns the input unchanged
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::scripted()` - Replays a fixed sequence of replies
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::params::GenerationParameters;

/// A request as seen by the mock provider
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The system instruction
    pub system_prompt: String,
    /// The text to translate
    pub text: String,
    /// Sampling parameters of this attempt
    pub params: GenerationParameters,
}

/// One scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this text
    Text(String),
    /// Fail with an API error
    Fail,
    /// Fail with a timeout
    Timeout,
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a translation
    Working,
    /// Returns the input text unchanged
    Echo,
    /// Always fails with an error
    Failing,
    /// Always fails with a timeout
    Timeout,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for deadline testing)
    Slow { delay_ms: u64 },
    /// Replays the given replies in order, then repeats the last one
    Scripted(Vec<MockReply>),
}

/// Default text returned by a working provider
pub const MOCK_TRANSLATION: &str = "这是一段译文";

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Every request received, oldest first
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Remaining scripted replies
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        let script = match &behavior {
            MockBehavior::Scripted(replies) => replies.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(script)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns its input unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose every request times out
    pub fn timeout() -> Self {
        Self::new(MockBehavior::Timeout)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that replays the given replies
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        Self::new(MockBehavior::Scripted(replies))
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of generation calls received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_scripted(&self) -> MockReply {
        let Ok(mut script) = self.script.lock() else {
            return MockReply::Fail;
        };
        if script.len() > 1 {
            script.pop_front().unwrap_or(MockReply::Fail)
        } else {
            script.front().cloned().unwrap_or(MockReply::Fail)
        }
    }

    fn reply(&self, reply: MockReply) -> Result<String, ProviderError> {
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
            MockReply::Timeout => Err(ProviderError::Timeout("Simulated timeout".to_string())),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior.clone(),
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            script: Arc::clone(&self.script),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        params: &GenerationParameters,
    ) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            system_prompt: system_prompt.to_string(),
            text: user_text.to_string(),
            params: *params,
        };
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match &self.behavior {
            MockBehavior::Working => Ok(match self.custom_response {
                Some(generator) => generator(&request),
                None => MOCK_TRANSLATION.to_string(),
            }),

            MockBehavior::Echo => Ok(request.text),

            MockBehavior::Failing => self.reply(MockReply::Fail),

            MockBehavior::Timeout => self.reply(MockReply::Timeout),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(MOCK_TRANSLATION.to_string())
            }

            MockBehavior::Scripted(_) => self.reply(self.next_scripted()),
        }
    }
}
