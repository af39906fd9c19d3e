/*!
 * Client for OpenAI-compatible chat completion servers.
 *
 * Local translation models are usually served by llama.cpp or a similar
 * server exposing `/v1/chat/completions`. Only the non-streaming form of the
 * API is used.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::params::GenerationParameters;

/// OpenAI-compatible client
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the server, with or without the `/v1` suffix
    endpoint: String,
    /// Model name sent with every request
    model: String,
    /// Optional bearer token
    api_key: Option<String>,
    /// Per-request timeout
    timeout: Duration,
}

/// Chat message object
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Message returned by the server
///
/// Both fields are optional; some servers omit the role or send a null content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
    /// Whether to stream the response
    stream: bool,
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of tokens to generate
    max_tokens: u32,
    /// Top probability mass to consider (nucleus sampling)
    top_p: f32,
    /// Penalty for tokens already present in the output
    frequency_penalty: f32,
}

impl ChatCompletionRequest {
    /// Create a new request carrying the given sampling parameters
    pub fn new(model: impl Into<String>, params: &GenerationParameters) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            stream: false,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    #[serde(default)]
    pub message: ResponseMessage,
}

/// Chat completion response
///
/// Servers that do not follow the OpenAI shape exactly may return a bare
/// `message` object instead of a `choices` list.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, falling back to the bare message
    pub fn into_text(self) -> String {
        match self.choices.into_iter().next() {
            Some(choice) => choice.message.content.unwrap_or_default(),
            None => self
                .message
                .and_then(|m| m.content)
                .unwrap_or_default(),
        }
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
        }
    }

    /// Build a URL under the `/v1` API root
    fn api_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/{}", base, path)
        } else {
            format!("{}/v1/{}", base, path)
        }
    }

    /// URL of the chat completion endpoint
    pub fn completions_url(&self) -> String {
        self.api_url("chat/completions")
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => builder,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(format!("no response within {:?}", self.timeout))
        } else if e.is_connect() {
            ProviderError::ConnectionError(e.to_string())
        } else {
            ProviderError::RequestFailed(e.to_string())
        }
    }

    /// Send a chat completion request
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let url = self.completions_url();
        debug!("Sending chat completion request to {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Chat completion API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        serde_json::from_str::<ChatCompletionResponse>(&body)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
        params: &GenerationParameters,
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest::new(&self.model, params)
            .add_message("system", system_prompt)
            .add_message("user", user_text);

        Ok(self.complete(&request).await?.into_text())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = self.api_url("models");
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Some servers do not implement the model listing
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
