//! AI assistant domain service.
//!
//! Upstream failures are logged with their detail and surfaced to clients as
//! a bare `503`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{AssistantChat, ChatCompletion, ChatCompletionError};
use crate::domain::{Caller, ChatMessage, ChatRole, ChatTranscript, Error, Permission};

const UNAVAILABLE: &str = "assistant is temporarily unavailable";

/// Assistant service proxying transcripts to a chat completion provider.
pub struct AssistantChatService<C: ?Sized> {
    completion: Arc<C>,
}

impl<C: ?Sized> AssistantChatService<C> {
    pub fn new(completion: Arc<C>) -> Self {
        Self { completion }
    }
}

fn log_failure(error: &ChatCompletionError) {
    match error {
        ChatCompletionError::NotConfigured => {
            tracing::debug!("assistant requested but no provider is configured");
        }
        other => tracing::warn!(error = %other, "chat completion failed"),
    }
}

#[async_trait]
impl<C> AssistantChat for AssistantChatService<C>
where
    C: ChatCompletion + ?Sized,
{
    async fn chat(
        &self,
        caller: &Caller,
        transcript: &ChatTranscript,
    ) -> Result<ChatMessage, Error> {
        caller.require(Permission::Read)?;
        let reply = self
            .completion
            .complete(&transcript.with_system_prompt())
            .await
            .map_err(|err| {
                log_failure(&err);
                Error::service_unavailable(UNAVAILABLE)
            })?;
        if reply.role != ChatRole::Assistant || reply.content.trim().is_empty() {
            tracing::warn!("chat completion returned an unusable message");
            return Err(Error::service_unavailable(UNAVAILABLE));
        }
        Ok(reply)
    }
}
