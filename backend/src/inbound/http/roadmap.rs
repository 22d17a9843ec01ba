//! Roadmap voting handlers.
//!
//! ```text
//! POST   /api/v1/roadmap/features                    {"title":"…","description":"…"}
//! GET    /api/v1/roadmap/features?status=PLANNED
//! POST   /api/v1/roadmap/features/{id}/vote
//! DELETE /api/v1/roadmap/features/{id}/vote
//! PUT    /api/v1/admin/roadmap/features/{id}/status  {"status":"IN_PROGRESS"}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Caller, Error, FeatureId, FeatureRequest, FeatureStatus, NewFeature, Page};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FeatureRequestPageSchema, FeatureRequestSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_uuid};

/// Body of `POST /api/v1/roadmap/features`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateFeatureRequest {
    #[schema(example = "Dark mode")]
    pub title: String,
    pub description: Option<String>,
}

/// Body of the admin status endpoint.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FeatureStatusRequest {
    /// `PLANNED`, `IN_PROGRESS` or `DONE`.
    #[schema(example = "IN_PROGRESS")]
    pub status: String,
}

/// Optional listing filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeatureFilter {
    /// Only features in this state.
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<FeatureStatus, Error> {
    FeatureStatus::from_str(raw.trim()).map_err(|err| Error::invalid_field("status", "invalid", err))
}

fn feature_id(raw: &str) -> Result<FeatureId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(FeatureId::from_uuid)
}

/// Propose a feature.
#[utoipa::path(
    post,
    path = "/api/v1/roadmap/features",
    request_body = CreateFeatureRequest,
    responses(
        (status = 201, description = "Feature created", body = FeatureRequestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["roadmap"],
    operation_id = "createFeature"
)]
#[post("/roadmap/features")]
pub async fn create_feature(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateFeatureRequest>,
) -> ApiResult<HttpResponse> {
    let feature = NewFeature::try_new(&payload.title, payload.description.as_deref())
        .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))?;
    let created = state.roadmap.create(&caller, &feature).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Features ordered by votes, then recency.
#[utoipa::path(
    get,
    path = "/api/v1/roadmap/features",
    params(FeatureFilter, PageQuery),
    responses(
        (status = 200, description = "Features", body = FeatureRequestPageSchema),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["roadmap"],
    operation_id = "listFeatures"
)]
#[get("/roadmap/features")]
pub async fn list_features(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<FeatureFilter>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<FeatureRequest>>> {
    let status = filter.status.as_deref().map(parse_status).transpose()?;
    let page = page.to_request()?;
    Ok(web::Json(
        state.roadmap_query.list(&caller, status, page).await?,
    ))
}

/// Vote for a feature. A second vote is a conflict.
#[utoipa::path(
    post,
    path = "/api/v1/roadmap/features/{id}/vote",
    params(("id" = String, Path, description = "Feature identifier")),
    responses(
        (status = 200, description = "Feature with updated tally", body = FeatureRequestSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already voted", body = ErrorSchema)
    ),
    tags = ["roadmap"],
    operation_id = "voteFeature"
)]
#[post("/roadmap/features/{id}/vote")]
pub async fn vote(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<FeatureRequest>> {
    let id = feature_id(&path)?;
    Ok(web::Json(state.roadmap.vote(&caller, &id).await?))
}

/// Withdraw a vote; withdrawing twice is harmless.
#[utoipa::path(
    delete,
    path = "/api/v1/roadmap/features/{id}/vote",
    params(("id" = String, Path, description = "Feature identifier")),
    responses(
        (status = 200, description = "Feature with updated tally", body = FeatureRequestSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["roadmap"],
    operation_id = "removeVote"
)]
#[delete("/roadmap/features/{id}/vote")]
pub async fn remove_vote(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<FeatureRequest>> {
    let id = feature_id(&path)?;
    Ok(web::Json(state.roadmap.remove_vote(&caller, &id).await?))
}

/// Move a feature through the delivery states.
#[utoipa::path(
    put,
    path = "/api/v1/admin/roadmap/features/{id}/status",
    params(("id" = String, Path, description = "Feature identifier")),
    request_body = FeatureStatusRequest,
    responses(
        (status = 200, description = "Updated feature", body = FeatureRequestSchema),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "setFeatureStatus"
)]
#[put("/admin/roadmap/features/{id}/status")]
pub async fn set_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<FeatureStatusRequest>,
) -> ApiResult<web::Json<FeatureRequest>> {
    let id = feature_id(&path)?;
    let status = parse_status(&payload.status)?;
    Ok(web::Json(
        state.roadmap.set_status(&caller, &id, status).await?,
    ))
}
