//! Blog handlers.
//!
//! ```text
//! GET  /api/v1/blog/posts
//! GET  /api/v1/blog/posts/{slug}
//! POST /api/v1/admin/blog/posts                {"title":"…","body":"…","slug":"optional"}
//! PUT  /api/v1/admin/blog/posts/{id}
//! POST /api/v1/admin/blog/posts/{id}/publish
//! ```
//!
//! Reading is public. Drafts are only visible to administrators; everyone
//! else gets `404`.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BlogPost, Caller, Error, Page, PostDraft, PostId, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{BlogPostPageSchema, BlogPostSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_uuid};

/// Body shared by post creation and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PostRequest {
    #[schema(example = "Launch day")]
    pub title: String,
    pub body: String,
    /// Derived from the title when omitted.
    #[schema(example = "launch-day")]
    pub slug: Option<String>,
}

impl TryFrom<&PostRequest> for PostDraft {
    type Error = Error;

    fn try_from(value: &PostRequest) -> Result<Self, Self::Error> {
        Self::try_new(&value.title, &value.body, value.slug.as_deref())
            .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))
    }
}

fn post_id(raw: &str) -> Result<PostId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(PostId::from_uuid)
}

/// Published posts, newest first. Administrators also see drafts.
#[utoipa::path(
    get,
    path = "/api/v1/blog/posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Posts", body = BlogPostPageSchema),
        (status = 400, description = "Invalid pagination", body = ErrorSchema)
    ),
    tags = ["blog"],
    operation_id = "listPosts",
    security([])
)]
#[get("/blog/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    viewer: Option<Caller>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<BlogPost>>> {
    let page = query.to_request()?;
    Ok(web::Json(state.blog_query.list(viewer, page).await?))
}

/// One post by slug.
#[utoipa::path(
    get,
    path = "/api/v1/blog/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = BlogPostSchema),
        (status = 404, description = "Not found or unpublished", body = ErrorSchema)
    ),
    tags = ["blog"],
    operation_id = "getPost",
    security([])
)]
#[get("/blog/posts/{slug}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    viewer: Option<Caller>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BlogPost>> {
    // A string that can never be a slug cannot name a post either.
    let slug = Slug::new(path.into_inner()).map_err(|_| Error::not_found("post not found"))?;
    Ok(web::Json(state.blog_query.get(viewer, &slug).await?))
}

/// Write a draft.
#[utoipa::path(
    post,
    path = "/api/v1/admin/blog/posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Draft created", body = BlogPostSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Slug already in use", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createPost"
)]
#[post("/admin/blog/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<PostRequest>,
) -> ApiResult<HttpResponse> {
    let draft = PostDraft::try_from(&payload.into_inner())?;
    let post = state.blog.create(&caller, &draft).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Replace a post's content.
#[utoipa::path(
    put,
    path = "/api/v1/admin/blog/posts/{id}",
    params(("id" = String, Path, description = "Post identifier")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Updated post", body = BlogPostSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Slug already in use", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updatePost"
)]
#[put("/admin/blog/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<PostRequest>,
) -> ApiResult<web::Json<BlogPost>> {
    let id = post_id(&path)?;
    let draft = PostDraft::try_from(&payload.into_inner())?;
    Ok(web::Json(state.blog.update(&caller, &id, &draft).await?))
}

/// Publish a post. Publishing again keeps the original date.
#[utoipa::path(
    post,
    path = "/api/v1/admin/blog/posts/{id}/publish",
    params(("id" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Published post", body = BlogPostSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "publishPost"
)]
#[post("/admin/blog/posts/{id}/publish")]
pub async fn publish_post(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<BlogPost>> {
    let id = post_id(&path)?;
    Ok(web::Json(state.blog.publish(&caller, &id).await?))
}
