//! Profile handlers.
//!
//! ```text
//! PUT /api/v1/profiles/me
//! GET /api/v1/profiles?role=developer&skill=rust&q=ada&limit=20&offset=0
//! GET /api/v1/profiles/{userId}
//! ```
//!
//! The rendered profile hides contact details and investment focus from
//! viewers who may not see them.

use std::str::FromStr;

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Caller, Error, Page, ProfileFilter, ProfileInput, ProfileView, Role, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ProfilePageSchema, ProfileViewSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_uuid};

/// Body of `PUT /api/v1/profiles/me`. Omitted fields are cleared.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub headline: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: Option<String>,
    #[schema(example = "https://example.com")]
    pub website: Option<String>,
    pub contact_email: Option<String>,
    /// Investors only.
    pub investment_focus: Option<String>,
}

impl From<ProfileRequest> for ProfileInput {
    fn from(value: ProfileRequest) -> Self {
        Self {
            headline: value.headline,
            bio: value.bio,
            skills: value.skills,
            location: value.location,
            website: value.website,
            contact_email: value.contact_email,
            investment_focus: value.investment_focus,
        }
    }
}

/// Discovery filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DiscoverQuery {
    /// Only profiles with this role.
    pub role: Option<String>,
    /// Only profiles listing this skill.
    pub skill: Option<String>,
    /// Free text matched against display name and headline.
    pub q: Option<String>,
}

impl TryFrom<&DiscoverQuery> for ProfileFilter {
    type Error = Error;

    fn try_from(value: &DiscoverQuery) -> Result<Self, Self::Error> {
        let role = value
            .role
            .as_deref()
            .map(|raw| Role::from_str(raw.trim()))
            .transpose()
            .map_err(|err| Error::invalid_field("role", "invalid", err.to_string()))?;
        Self::try_new(role, value.skill.as_deref(), value.q.as_deref())
            .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))
    }
}

/// Create or replace the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Stored profile", body = ProfileViewSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Key lacks write permission", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "upsertProfile"
)]
#[put("/profiles/me")]
pub async fn upsert_profile(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<ProfileView>> {
    let input = ProfileInput::from(payload.into_inner());
    Ok(web::Json(state.profiles.upsert(&caller, &input).await?))
}

/// Browse profiles.
#[utoipa::path(
    get,
    path = "/api/v1/profiles",
    params(DiscoverQuery, PageQuery),
    responses(
        (status = 200, description = "Profiles", body = ProfilePageSchema),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "discoverProfiles"
)]
#[get("/profiles")]
pub async fn discover_profiles(
    state: web::Data<HttpState>,
    caller: Caller,
    filter: web::Query<DiscoverQuery>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<ProfileView>>> {
    let filter = ProfileFilter::try_from(&*filter)?;
    let page = page.to_request()?;
    Ok(web::Json(
        state.profiles_query.discover(&caller, &filter, page).await?,
    ))
}

/// One user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{user_id}",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile", body = ProfileViewSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profiles/{user_id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileView>> {
    let user = UserId::from_uuid(parse_uuid(&path, FieldName::new("userId"))?);
    Ok(web::Json(state.profiles_query.get(&caller, &user).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockProfileCommand, MockProfileQuery};
    use crate::domain::{AuthenticatedUser, DisplayName};
    use crate::inbound::http::test_utils::{login_cookie, test_app, test_state};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn view(user: &UserId, role: Role) -> ProfileView {
        ProfileView {
            user_id: user.clone(),
            display_name: DisplayName::new("Grace Hopper").expect("name"),
            role,
            headline: Some("Compiler pioneer".into()),
            bio: None,
            skills: vec!["cobol".into()],
            location: None,
            website: None,
            contact_email: None,
            investment_focus: None,
            updated_at: None,
        }
    }

    #[actix_web::test]
    async fn upsert_forwards_input() {
        let user = AuthenticatedUser::new(UserId::random(), Role::Developer);
        let rendered = view(&user.id, Role::Developer);
        let mut profiles = MockProfileCommand::new();
        profiles
            .expect_upsert()
            .withf(|_, input| input.skills == ["cobol"] && input.bio.is_none())
            .return_once(move |_, _| Ok(rendered));
        let state = HttpState {
            profiles: Arc::new(profiles),
            ..test_state()
        };
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/profiles/me")
                .set_json(json!({"headline": "Compiler pioneer", "skills": ["cobol"]}))
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["displayName"], "Grace Hopper");
        assert!(body.get("contactEmail").is_none());
    }

    #[actix_web::test]
    async fn discover_parses_filters() {
        let user = AuthenticatedUser::new(UserId::random(), Role::Investor);
        let mut query = MockProfileQuery::new();
        query
            .expect_discover()
            .withf(|_, filter, page| {
                filter.role == Some(Role::Developer)
                    && filter.skill.as_deref() == Some("rust")
                    && page.limit() == 10
            })
            .return_once(|_, _, page| Ok(Page::new(Vec::new(), page, 0)));
        let state = HttpState {
            profiles_query: Arc::new(query),
            ..test_state()
        };
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profiles?role=developer&skill=rust&limit=10")
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn discover_rejects_unknown_role() {
        let user = AuthenticatedUser::new(UserId::random(), Role::Investor);
        let app = test::init_service(test_app(test_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/profiles?role=wizard")
                .cookie(login_cookie(&user).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "role");
    }

    #[actix_web::test]
    async fn get_profile_passes_target() {
        let viewer = AuthenticatedUser::new(UserId::random(), Role::Founder);
        let target = UserId::random();
        let rendered = view(&target, Role::Investor);
        let expected = target.clone();
        let mut query = MockProfileQuery::new();
        query
            .expect_get()
            .withf(move |_, user| *user == expected)
            .return_once(move |_, _| Ok(rendered));
        let state = HttpState {
            profiles_query: Arc::new(query),
            ..test_state()
        };
        let app = test::init_service(test_app(state)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/profiles/{target}"))
                .cookie(login_cookie(&viewer).await)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
