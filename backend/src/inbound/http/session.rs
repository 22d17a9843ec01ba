//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting or retrieving the logged-in
//! principal. The cookie carries the user id and role; both are re-validated
//! on every read.

use std::str::FromStr;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthenticatedUser, Error, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated principal in the session cookie.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// replayed as an authenticated one.
    pub fn persist_user(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        self.insert(USER_ID_KEY, user.id.to_string())?;
        self.insert(ROLE_KEY, user.role.as_str().to_owned())
    }

    fn insert(&self, key: &str, value: String) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Fetch the current principal from the session, if present.
    ///
    /// A cookie holding an unparseable id or role is treated as anonymous.
    pub fn user(&self) -> Result<Option<AuthenticatedUser>, Error> {
        let (Some(raw_id), Some(raw_role)) = (self.read(USER_ID_KEY)?, self.read(ROLE_KEY)?)
        else {
            return Ok(None);
        };
        let id = match UserId::new(raw_id) {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!("invalid user id in session cookie: {error}");
                return Ok(None);
            }
        };
        match Role::from_str(&raw_role) {
            Ok(role) => Ok(Some(AuthenticatedUser::new(id, role))),
            Err(error) => {
                tracing::warn!("invalid role in session cookie: {error}");
                Ok(None)
            }
        }
    }

    /// Require an authenticated principal or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<AuthenticatedUser, Error> {
        self.user()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every value and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[derive(serde::Deserialize)]
    struct RawSession {
        id: String,
        role: String,
    }

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/require",
                web::get().to(|session: SessionContext| async move {
                    let user = session.require_user()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(format!("{}:{}", user.id, user.role)))
                }),
            )
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    let id = UserId::new(FIXTURE_ID).expect("fixture id");
                    session.persist_user(&AuthenticatedUser::new(id, Role::Investor))?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/clear",
                web::get().to(|session: SessionContext| async move {
                    session.clear();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/set-raw",
                web::get().to(|session: Session, query: web::Query<RawSession>| async move {
                    let RawSession { id, role } = query.into_inner();
                    session.insert(USER_ID_KEY, id).expect("set user id");
                    session.insert(ROLE_KEY, role).expect("set role");
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_user_and_role() {
        let app = test::init_service(session_test_app()).await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, format!("{FIXTURE_ID}:investor"));
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/require").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_values_are_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        for query in [
            "/set-raw?id=not-a-uuid&role=founder".to_owned(),
            format!("/set-raw?id={FIXTURE_ID}&role=overlord"),
        ] {
            let set_res =
                test::call_service(&app, test::TestRequest::get().uri(&query).to_request()).await;
            let cookie = session_cookie(&set_res);
            let res = test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/require")
                    .cookie(cookie)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{query}");
        }
    }

    #[actix_web::test]
    async fn cleared_session_is_anonymous() {
        let app = test::init_service(session_test_app()).await;
        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let clear_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/clear")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;
        let expired = session_cookie(&clear_res);
        assert_eq!(expired.value(), "");
    }
}
