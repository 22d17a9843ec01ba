//! Direct messaging handlers.
//!
//! ```text
//! POST /api/v1/conversations                 {"userId":"…"}
//! GET  /api/v1/conversations
//! GET  /api/v1/conversations/{id}/messages
//! POST /api/v1/conversations/{id}/messages   {"body":"hi"}
//! POST /api/v1/conversations/{id}/typing
//! ```
//!
//! Stored messages and typing signals are also pushed to the conversation's
//! private real-time channel by the messaging service.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Caller, Conversation, ConversationId, Error, Message, MessageBody, Page, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ConversationPageSchema, ConversationSchema, ErrorSchema, MessagePageSchema, MessageSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_uuid};

/// Body of `POST /api/v1/conversations`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    /// The other participant.
    pub user_id: String,
}

/// Body of `POST /api/v1/conversations/{id}/messages`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendMessageRequest {
    /// Message text, `1..=4000` characters after sanitising.
    pub body: String,
}

fn conversation_id(raw: &str) -> Result<ConversationId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(ConversationId::from_uuid)
}

/// Open a direct conversation, reusing an existing one with the same user.
#[utoipa::path(
    post,
    path = "/api/v1/conversations",
    request_body = StartConversationRequest,
    responses(
        (status = 200, description = "Conversation", body = ConversationSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["messaging"],
    operation_id = "startConversation"
)]
#[post("/conversations")]
pub async fn start_conversation(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<StartConversationRequest>,
) -> ApiResult<web::Json<Conversation>> {
    let other = UserId::from_uuid(parse_uuid(&payload.user_id, FieldName::new("userId"))?);
    Ok(web::Json(
        state.messaging.start_conversation(&caller, &other).await?,
    ))
}

/// The caller's conversations, most recent activity first.
#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    params(PageQuery),
    responses(
        (status = 200, description = "Conversations", body = ConversationPageSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["messaging"],
    operation_id = "listConversations"
)]
#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Conversation>>> {
    let page = query.to_request()?;
    Ok(web::Json(
        state.messaging_query.conversations(&caller, page).await?,
    ))
}

/// Messages of one conversation, for its participants.
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation identifier"), PageQuery),
    responses(
        (status = 200, description = "Messages", body = MessagePageSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["messaging"],
    operation_id = "listMessages"
)]
#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Message>>> {
    let id = conversation_id(&path)?;
    let page = query.to_request()?;
    Ok(web::Json(
        state.messaging_query.messages(&caller, &id, page).await?,
    ))
}

/// Post a message.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    params(("id" = String, Path, description = "Conversation identifier")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageSchema),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["messaging"],
    operation_id = "sendMessage"
)]
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<SendMessageRequest>,
) -> ApiResult<HttpResponse> {
    let id = conversation_id(&path)?;
    let body = MessageBody::try_new(&payload.body)
        .map_err(|err| Error::invalid_field("body", "invalid", format!("body {err}")))?;
    let message = state.messaging.send_message(&caller, &id, body).await?;
    Ok(HttpResponse::Created().json(message))
}

/// Tell the other participant the caller is typing.
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/typing",
    params(("id" = String, Path, description = "Conversation identifier")),
    responses(
        (status = 204, description = "Signal sent"),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["messaging"],
    operation_id = "signalTyping"
)]
#[post("/conversations/{id}/typing")]
pub async fn signal_typing(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = conversation_id(&path)?;
    state.messaging.typing(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockMessagingCommand, MockMessagingQuery};
    use crate::domain::{AuthenticatedUser, MessageId, Role};
    use crate::inbound::http::test_utils::{login_cookie, test_app, test_state};
    use crate::test_support::fixture_timestamp;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn sender() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::random(), Role::Developer)
    }

    #[actix_web::test]
    async fn send_sanitises_before_the_service() {
        let user = sender();
        let conversation = ConversationId::random();
        let author = user.id.clone();
        let mut messaging = MockMessagingCommand::new();
        messaging
            .expect_send_message()
            .withf(|_, _, body| body.as_ref() == "hello")
            .return_once(move |_, id, body| {
                Ok(Message {
                    id: MessageId::random(),
                    conversation_id: *id,
                    sender_id: author,
                    body: body.into(),
                    created_at: fixture_timestamp(),
                })
            });
        let state = HttpState {
            messaging: Arc::new(messaging),
            ..test_state()
        };
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/conversations/{conversation}/messages"))
                .set_json(json!({"body": "<script>alert(1)</script>hello"}))
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["body"], "hello");
        assert_eq!(body["conversationId"], conversation.to_string());
    }

    #[actix_web::test]
    async fn blank_message_is_rejected() {
        let user = sender();
        let app = test::init_service(test_app(test_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/conversations/{}/messages",
                    ConversationId::random()
                ))
                .set_json(json!({"body": "<b> </b>"}))
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "body");
    }

    #[actix_web::test]
    async fn outsider_cannot_read_messages() {
        let user = sender();
        let mut query = MockMessagingQuery::new();
        query
            .expect_messages()
            .return_once(|_, _, _| Err(Error::forbidden("not a participant")));
        let state = HttpState {
            messaging_query: Arc::new(query),
            ..test_state()
        };
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/conversations/{}/messages",
                    ConversationId::random()
                ))
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn typing_returns_no_content() {
        let user = sender();
        let mut messaging = MockMessagingCommand::new();
        messaging.expect_typing().times(1).return_once(|_, _| Ok(()));
        let state = HttpState {
            messaging: Arc::new(messaging),
            ..test_state()
        };
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!(
                    "/api/v1/conversations/{}/typing",
                    ConversationId::random()
                ))
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn start_requires_valid_user_id() {
        let user = sender();
        let app = test::init_service(test_app(test_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/conversations")
                .set_json(json!({"userId": "someone"}))
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "userId");
    }
}
