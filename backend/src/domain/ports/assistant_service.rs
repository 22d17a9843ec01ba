//! Driving port for the AI assistant.

use async_trait::async_trait;

use crate::domain::{Caller, ChatMessage, ChatTranscript, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantChat: Send + Sync {
    /// Answer the transcript; an unavailable provider yields
    /// `503 service_unavailable`.
    async fn chat(
        &self,
        caller: &Caller,
        transcript: &ChatTranscript,
    ) -> Result<ChatMessage, Error>;
}
