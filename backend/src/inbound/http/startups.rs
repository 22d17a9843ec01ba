//! Startup and team invite handlers.
//!
//! ```text
//! POST   /api/v1/startups                {"name":"Acme","tagline":"…","stage":"seed"}
//! GET    /api/v1/startups/mine
//! GET    /api/v1/startups/{id}
//! GET    /api/v1/startups/{id}/members
//! POST   /api/v1/startups/{id}/invites   {"email":"dev@example.com"}
//! POST   /api/v1/invites/accept          {"token":"…"}
//! DELETE /api/v1/invites/{id}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Caller, Error, InviteId, NewStartup, Startup, StartupId, StartupMember, StartupStage,
    TeamInvite,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ErrorSchema, IssuedInviteSchema, StartupMemberSchema, StartupSchema, TeamInviteSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_uuid};

/// Body of `POST /api/v1/startups`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStartupRequest {
    #[schema(example = "Acme Robotics")]
    pub name: String,
    pub tagline: Option<String>,
    /// `idea`, `prototype`, `pre_seed`, `seed`, `series_a` or `growth`.
    #[schema(example = "seed")]
    pub stage: String,
}

impl TryFrom<&CreateStartupRequest> for NewStartup {
    type Error = Error;

    fn try_from(value: &CreateStartupRequest) -> Result<Self, Self::Error> {
        let stage = StartupStage::from_str(value.stage.trim())
            .map_err(|err| Error::invalid_field("stage", "invalid", err))?;
        Self::try_new(&value.name, value.tagline.as_deref(), stage)
            .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))
    }
}

/// Body of `POST /api/v1/startups/{id}/invites`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InviteRequest {
    #[schema(example = "dev@example.com")]
    pub email: String,
}

/// Body of `POST /api/v1/invites/accept`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AcceptInviteRequest {
    pub token: String,
}

fn startup_id(raw: &str) -> Result<StartupId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(StartupId::from_uuid)
}

/// Found a startup; the creator becomes its first member.
#[utoipa::path(
    post,
    path = "/api/v1/startups",
    request_body = CreateStartupRequest,
    responses(
        (status = 201, description = "Startup created", body = StartupSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only founders create startups", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "createStartup"
)]
#[post("/startups")]
pub async fn create_startup(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateStartupRequest>,
) -> ApiResult<HttpResponse> {
    let startup = NewStartup::try_from(&payload.into_inner())?;
    let created = state.startups.create(&caller, &startup).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Startups the caller belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/startups/mine",
    responses(
        (status = 200, description = "Startups", body = [StartupSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "myStartups"
)]
#[get("/startups/mine")]
pub async fn my_startups(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<Startup>>> {
    Ok(web::Json(state.startups_query.mine(&caller).await?))
}

/// One startup.
#[utoipa::path(
    get,
    path = "/api/v1/startups/{id}",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Startup", body = StartupSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "getStartup"
)]
#[get("/startups/{id}")]
pub async fn get_startup(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<Startup>> {
    let id = startup_id(&path)?;
    Ok(web::Json(state.startups_query.get(&caller, &id).await?))
}

/// Team roster, visible to members.
#[utoipa::path(
    get,
    path = "/api/v1/startups/{id}/members",
    params(("id" = String, Path, description = "Startup identifier")),
    responses(
        (status = 200, description = "Members", body = [StartupMemberSchema]),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "listMembers"
)]
#[get("/startups/{id}/members")]
pub async fn list_members(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<StartupMember>>> {
    let id = startup_id(&path)?;
    Ok(web::Json(state.startups_query.members(&caller, &id).await?))
}

/// Invite someone by email. The token is returned once and not stored.
#[utoipa::path(
    post,
    path = "/api/v1/startups/{id}/invites",
    params(("id" = String, Path, description = "Startup identifier")),
    request_body = InviteRequest,
    responses(
        (status = 201, description = "Invite issued", body = IssuedInviteSchema),
        (status = 400, description = "Invalid email", body = ErrorSchema),
        (status = 403, description = "Only the owner may invite", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "inviteMember"
)]
#[post("/startups/{id}/invites")]
pub async fn invite_member(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<InviteRequest>,
) -> ApiResult<HttpResponse> {
    let id = startup_id(&path)?;
    let issued = state.startups.invite(&caller, &id, &payload.email).await?;
    Ok(HttpResponse::Created().json(issued))
}

/// Join a startup using an invite token.
#[utoipa::path(
    post,
    path = "/api/v1/invites/accept",
    request_body = AcceptInviteRequest,
    responses(
        (status = 200, description = "Membership created", body = StartupMemberSchema),
        (status = 403, description = "Invite addressed to another email", body = ErrorSchema),
        (status = 404, description = "Unknown token", body = ErrorSchema),
        (status = 409, description = "Invite expired or no longer pending", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "acceptInvite"
)]
#[post("/invites/accept")]
pub async fn accept_invite(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<AcceptInviteRequest>,
) -> ApiResult<web::Json<StartupMember>> {
    let token = payload.token.trim();
    if token.is_empty() {
        return Err(missing_field_error(FieldName::new("token")));
    }
    Ok(web::Json(state.startups.accept_invite(&caller, token).await?))
}

/// Withdraw a pending invite.
#[utoipa::path(
    delete,
    path = "/api/v1/invites/{id}",
    params(("id" = String, Path, description = "Invite identifier")),
    responses(
        (status = 200, description = "Revoked invite", body = TeamInviteSchema),
        (status = 403, description = "Only the owner may revoke", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invite no longer pending", body = ErrorSchema)
    ),
    tags = ["startups"],
    operation_id = "revokeInvite"
)]
#[delete("/invites/{id}")]
pub async fn revoke_invite(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<TeamInvite>> {
    let id = InviteId::from_uuid(parse_uuid(&path, FieldName::new("id"))?);
    Ok(web::Json(state.startups.revoke_invite(&caller, &id).await?))
}
