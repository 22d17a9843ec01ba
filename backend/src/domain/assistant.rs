//! Chat transcripts forwarded to the AI assistant.
//!
//! Clients send the visible conversation only; the system prompt is always
//! prepended server-side and cannot be supplied or overridden by a client.

use serde::{Deserialize, Serialize};

/// Most messages accepted in one request.
pub const TRANSCRIPT_MAX_MESSAGES: usize = 20;
/// Longest accepted message content.
pub const CHAT_MESSAGE_MAX: usize = 4_000;

/// Instructions prepended to every completion request.
pub const SYSTEM_PROMPT: &str = "You are the DFDS.io assistant. You help founders, developers, \
and investors use the platform: building profiles, forming startup teams, messaging, sending \
payments, managing API keys, and modelling funding rounds with the equity calculator. Answer \
concisely. Do not give legal, tax, or investment advice; suggest consulting a professional \
instead.";

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Validation errors for a client transcript.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    #[error("between 1 and {max} messages are required")]
    MessageCount { max: usize },
    #[error("message {index} must be between 1 and {max} characters")]
    MessageLength { index: usize, max: usize },
    #[error("message {index} may not use the system role")]
    SystemRole { index: usize },
}

/// Validated client transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranscript(Vec<ChatMessage>);

impl ChatTranscript {
    pub fn try_new(messages: Vec<ChatMessage>) -> Result<Self, TranscriptError> {
        if messages.is_empty() || messages.len() > TRANSCRIPT_MAX_MESSAGES {
            return Err(TranscriptError::MessageCount {
                max: TRANSCRIPT_MAX_MESSAGES,
            });
        }
        for (index, message) in messages.iter().enumerate() {
            if message.role == ChatRole::System {
                return Err(TranscriptError::SystemRole { index });
            }
            let length = message.content.trim().chars().count();
            if length == 0 || message.content.chars().count() > CHAT_MESSAGE_MAX {
                return Err(TranscriptError::MessageLength {
                    index,
                    max: CHAT_MESSAGE_MAX,
                });
            }
        }
        Ok(Self(messages))
    }

    /// Messages to send upstream, starting with the system prompt.
    pub fn with_system_prompt(&self) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT))
            .chain(self.0.iter().cloned())
            .collect()
    }
}
