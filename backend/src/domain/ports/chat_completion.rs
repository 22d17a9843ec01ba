//! Port for an OpenAI-compatible chat completion provider.

use async_trait::async_trait;

use crate::domain::ChatMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by chat completion adapters.
    pub enum ChatCompletionError {
        /// No provider is configured.
        NotConfigured => "chat completion provider is not configured",
        /// The provider could not be reached.
        Transport { message: String } => "chat completion transport failed: {message}",
        /// The provider answered with a failure status.
        Upstream { status: u16 } => "chat completion provider returned status {status}",
        /// The provider's answer could not be understood.
        InvalidResponse { message: String } => "chat completion response invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Complete `messages` and return the assistant's reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ChatCompletionError>;
}

/// Provider used when no assistant endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredChatCompletion;

#[async_trait]
impl ChatCompletion for UnconfiguredChatCompletion {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
    ) -> Result<ChatMessage, ChatCompletionError> {
        Err(ChatCompletionError::not_configured())
    }
}
