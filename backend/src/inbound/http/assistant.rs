//! AI assistant proxy.
//!
//! ```text
//! POST /api/v1/assistant/chat {"messages":[{"role":"user","content":"How do I invite a co-founder?"}]}
//! ```

use actix_web::{post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Caller, ChatMessage, ChatTranscript, Error, TranscriptError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ChatMessageSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/v1/assistant/chat`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Prior turns plus the new question, oldest first.
    #[schema(value_type = Vec<ChatMessageSchema>)]
    pub messages: Vec<ChatMessage>,
}

fn map_transcript_error(err: TranscriptError) -> Error {
    Error::invalid_field("messages", "invalid", err.to_string())
}

/// Ask the assistant a question.
#[utoipa::path(
    post,
    path = "/api/v1/assistant/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatMessageSchema),
        (status = 400, description = "Invalid transcript", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Assistant unavailable", body = ErrorSchema)
    ),
    tags = ["assistant"],
    operation_id = "assistantChat"
)]
#[post("/assistant/chat")]
pub async fn chat(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ChatRequest>,
) -> ApiResult<web::Json<ChatMessage>> {
    let transcript =
        ChatTranscript::try_new(payload.into_inner().messages).map_err(map_transcript_error)?;
    Ok(web::Json(state.assistant.chat(&caller, &transcript).await?))
}
