//! API key management for signed-in users.
//!
//! ```text
//! POST   /api/v1/api-keys       {"name":"ci","permission":"read","expiresInDays":30}
//! GET    /api/v1/api-keys
//! DELETE /api/v1/api-keys/{id}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiKeyId, ApiKeySummary, Caller, Error, NewApiKey, Permission};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ApiKeySummarySchema, CreatedApiKeySchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Body of `POST /api/v1/api-keys`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyRequest {
    #[schema(example = "deploy bot")]
    pub name: String,
    /// `read`, `write` or `admin`.
    #[schema(example = "read")]
    pub permission: String,
    /// Days until expiry, `1..=365`; omitted keys never expire.
    #[serde(default)]
    pub expires_in_days: Option<u32>,
}

impl TryFrom<&CreateApiKeyRequest> for NewApiKey {
    type Error = Error;

    fn try_from(value: &CreateApiKeyRequest) -> Result<Self, Self::Error> {
        let permission = Permission::from_str(value.permission.trim())
            .map_err(|err| Error::invalid_field("permission", "invalid", err.to_string()))?;
        Self::try_new(&value.name, permission, value.expires_in_days)
            .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))
    }
}

/// Mint a key. The plaintext token is only ever returned here.
#[utoipa::path(
    post,
    path = "/api/v1/api-keys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "Key created", body = CreatedApiKeySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Keys cannot mint keys, or permission too broad", body = ErrorSchema)
    ),
    tags = ["api-keys"],
    operation_id = "createApiKey"
)]
#[post("/api-keys")]
pub async fn create_api_key(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateApiKeyRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewApiKey::try_from(&payload.into_inner())?;
    let created = state.api_keys.create(&caller, &request).await?;
    Ok(HttpResponse::Created().json(created))
}

/// The caller's keys, without secrets.
#[utoipa::path(
    get,
    path = "/api/v1/api-keys",
    responses(
        (status = 200, description = "Keys", body = [ApiKeySummarySchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Session required", body = ErrorSchema)
    ),
    tags = ["api-keys"],
    operation_id = "listApiKeys"
)]
#[get("/api-keys")]
pub async fn list_api_keys(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<ApiKeySummary>>> {
    Ok(web::Json(state.api_keys.list(&caller).await?))
}

/// Revoke one of the caller's keys. Revoking twice is harmless.
#[utoipa::path(
    delete,
    path = "/api/v1/api-keys/{id}",
    params(("id" = String, Path, description = "Key identifier")),
    responses(
        (status = 200, description = "Revoked key", body = ApiKeySummarySchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["api-keys"],
    operation_id = "revokeApiKey"
)]
#[delete("/api-keys/{id}")]
pub async fn revoke_api_key(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<ApiKeySummary>> {
    let id = ApiKeyId::from_uuid(parse_uuid(&path, FieldName::new("id"))?);
    Ok(web::Json(state.api_keys.revoke(&caller, &id).await?))
}
