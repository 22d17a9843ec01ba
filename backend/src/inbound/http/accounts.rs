//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/register {"email":"ada@example.com","displayName":"Ada","password":"…","role":"founder"}
//! POST /api/v1/login    {"email":"ada@example.com","password":"…"}
//! POST /api/v1/logout
//! GET  /api/v1/users/me
//! GET  /api/v1/admin/users?limit=20&offset=0
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AuthenticatedUser, Caller, CredentialsValidationError, Error, LoginCredentials, Page,
    Registration, Role, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserPageSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::PageQuery;

/// Self-service registration body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub display_name: String,
    pub password: String,
    /// One of `founder`, `developer`, `investor`.
    #[schema(example = "founder")]
    pub role: String,
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::Email(_) => ("email", "invalid_email"),
        CredentialsValidationError::DisplayName(_) => ("displayName", "invalid_display_name"),
        CredentialsValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialsValidationError::PasswordLength { .. } => ("password", "password_length"),
        CredentialsValidationError::ForbiddenRole => ("role", "forbidden_role"),
    };
    Error::invalid_field(field, code, err.to_string())
}

impl TryFrom<&RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: &RegisterRequest) -> Result<Self, Self::Error> {
        let role = Role::from_str(value.role.trim())
            .map_err(|err| Error::invalid_field("role", "invalid_role", err.to_string()))?;
        Self::try_new(&value.email, &value.display_name, &value.password, role)
            .map_err(map_credentials_error)
    }
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(&payload.into_inner())?;
    let user = state.registration.register(&registration).await?;
    session.persist_user(&AuthenticatedUser::new(user.id().clone(), user.role()))?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate with email and password and establish a session.
///
/// Unknown accounts and wrong passwords produce the same `401`.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_credentials_error)?;
    let principal = state.login.authenticate(&credentials).await?;
    session.persist_user(&principal)?;
    let user = state
        .users
        .current_user(&Caller::from_session(principal))
        .await?;
    Ok(web::Json(user))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The authenticated account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(state: web::Data<HttpState>, caller: Caller) -> ApiResult<web::Json<User>> {
    Ok(web::Json(state.users.current_user(&caller).await?))
}

/// Every account, for administrators.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users", body = UserPageSchema),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<User>>> {
    let page = query.to_request()?;
    Ok(web::Json(state.users.list_users(&caller, page).await?))
}
