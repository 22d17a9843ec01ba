//! Wire types for OpenAI-compatible chat completion requests.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, ChatRole};

#[derive(Debug, Serialize)]
pub(super) struct CompletionRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub(super) struct CompletionResponseDto {
    #[serde(default)]
    choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
struct ChoiceDto {
    message: ChoiceMessageDto,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageDto {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponseDto {
    /// The first choice's text as an assistant message.
    pub(super) fn into_reply(self) -> Result<ChatMessage, String> {
        let content = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_owned())?
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| "first choice has no content".to_owned())?;
        Ok(ChatMessage::new(ChatRole::Assistant, content))
    }
}
