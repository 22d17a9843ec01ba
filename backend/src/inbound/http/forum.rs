//! Discussion thread handlers.
//!
//! ```text
//! GET    /api/v1/threads
//! GET    /api/v1/threads/{id}
//! POST   /api/v1/threads               {"title":"…","body":"…"}
//! POST   /api/v1/threads/{id}/replies  {"body":"…"}
//! DELETE /api/v1/threads/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Caller, Error, NewReply, NewThread, Page, Thread, ThreadDetail, ThreadId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, ReplySchema, ThreadDetailSchema, ThreadPageSchema, ThreadSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_uuid};

/// Body of `POST /api/v1/threads`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateThreadRequest {
    pub title: String,
    pub body: String,
}

/// Body of `POST /api/v1/threads/{id}/replies`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReplyRequest {
    pub body: String,
}

fn validation(err: crate::domain::ThreadValidationError) -> Error {
    Error::invalid_field(err.field(), "invalid", err.to_string())
}

fn thread_id(raw: &str) -> Result<ThreadId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(ThreadId::from_uuid)
}

/// Threads, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/threads",
    params(PageQuery),
    responses(
        (status = 200, description = "Threads", body = ThreadPageSchema),
        (status = 400, description = "Invalid pagination", body = ErrorSchema)
    ),
    tags = ["threads"],
    operation_id = "listThreads",
    security([])
)]
#[get("/threads")]
pub async fn list_threads(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Thread>>> {
    let page = query.to_request()?;
    Ok(web::Json(state.forum_query.list(page).await?))
}

/// A thread with its replies.
#[utoipa::path(
    get,
    path = "/api/v1/threads/{id}",
    params(("id" = String, Path, description = "Thread identifier")),
    responses(
        (status = 200, description = "Thread", body = ThreadDetailSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["threads"],
    operation_id = "getThread",
    security([])
)]
#[get("/threads/{id}")]
pub async fn get_thread(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ThreadDetail>> {
    let id = thread_id(&path)?;
    Ok(web::Json(state.forum_query.get(&id).await?))
}

/// Start a thread.
#[utoipa::path(
    post,
    path = "/api/v1/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["threads"],
    operation_id = "createThread"
)]
#[post("/threads")]
pub async fn create_thread(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateThreadRequest>,
) -> ApiResult<HttpResponse> {
    let thread = NewThread::try_new(&payload.title, &payload.body).map_err(validation)?;
    let created = state.forum.create_thread(&caller, &thread).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Reply to a thread.
#[utoipa::path(
    post,
    path = "/api/v1/threads/{id}/replies",
    params(("id" = String, Path, description = "Thread identifier")),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply created", body = ReplySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["threads"],
    operation_id = "replyToThread"
)]
#[post("/threads/{id}/replies")]
pub async fn reply(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<ReplyRequest>,
) -> ApiResult<HttpResponse> {
    let id = thread_id(&path)?;
    let reply = NewReply::try_new(&payload.body).map_err(validation)?;
    let created = state.forum.reply(&caller, &id, &reply).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Delete a thread and its replies. Authors and administrators only.
#[utoipa::path(
    delete,
    path = "/api/v1/threads/{id}",
    params(("id" = String, Path, description = "Thread identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["threads"],
    operation_id = "deleteThread"
)]
#[delete("/threads/{id}")]
pub async fn delete_thread(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = thread_id(&path)?;
    state.forum.delete_thread(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
