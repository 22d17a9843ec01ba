//! Reqwest-backed OpenAI-compatible chat completion client.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and decoding the first choice. Upstream bodies are
//! logged at debug level and never returned to callers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::dto::{CompletionRequestDto, CompletionResponseDto};
use crate::domain::ChatMessage;
use crate::domain::ports::{ChatCompletion, ChatCompletionError};

/// Provider location and credentials.
pub struct OpenAiChatSettings {
    /// Full URL of the chat completions endpoint.
    pub endpoint: Url,
    /// Bearer token sent with every request.
    pub api_key: String,
    /// Model name forwarded to the provider.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Chat completion client for providers speaking the OpenAI wire format.
pub struct OpenAiChatClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    /// Build a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: OpenAiChatSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint,
            api_key: settings.api_key,
            model: settings.model,
        })
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, ChatCompletionError> {
        let body = CompletionRequestDto {
            model: &self.model,
            messages,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ChatCompletionError::transport(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ChatCompletionError::transport(err.to_string()))?;
        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&bytes),
                "chat completion provider failed"
            );
            return Err(ChatCompletionError::upstream(status.as_u16()));
        }
        parse_reply(&bytes)
    }
}

fn parse_reply(body: &[u8]) -> Result<ChatMessage, ChatCompletionError> {
    let decoded: CompletionResponseDto = serde_json::from_slice(body)
        .map_err(|err| ChatCompletionError::invalid_response(err.to_string()))?;
    decoded
        .into_reply()
        .map_err(ChatCompletionError::invalid_response)
}
