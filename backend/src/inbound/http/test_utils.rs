//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::AuthenticatedUser;
use crate::domain::ports::{
    MockApiKeyAuthenticator, MockApiKeyCommand, MockAssistantChat, MockBlogCommand,
    MockBlogQuery, MockForumCommand, MockForumQuery, MockLoginService, MockMessagingCommand,
    MockMessagingQuery, MockPaymentCommand, MockPaymentQuery, MockProfileCommand,
    MockProfileQuery, MockRegistrationService, MockRoadmapCommand, MockRoadmapQuery,
    MockStartupCommand, MockStartupQuery, MockUsersQuery,
};
use crate::inbound::http::routes;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_config, query_config};

/// Signing key shared by every test app so cookies minted by
/// [`login_cookie`] are accepted elsewhere.
const TEST_KEY: [u8; 64] = [0x5a; 64];

/// Build a session middleware configured for tests.
///
/// - Uses a fixed signing/encryption key.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&TEST_KEY))
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Pull the session cookie out of a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mint a session cookie for `user`.
pub async fn login_cookie(user: &AuthenticatedUser) -> Cookie<'static> {
    let principal = user.clone();
    let app = test::init_service(App::new().wrap(test_session_middleware()).route(
        "/",
        web::get().to(move |session: SessionContext| {
            let principal = principal.clone();
            async move {
                session.persist_user(&principal)?;
                Ok::<_, crate::domain::Error>(HttpResponse::Ok().finish())
            }
        }),
    ))
    .await;
    let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    session_cookie(&response)
}

/// State whose ports carry no expectations; any call fails the test.
pub fn test_state() -> HttpState {
    HttpState {
        login: Arc::new(MockLoginService::new()),
        registration: Arc::new(MockRegistrationService::new()),
        users: Arc::new(MockUsersQuery::new()),
        api_key_auth: Arc::new(MockApiKeyAuthenticator::new()),
        api_keys: Arc::new(MockApiKeyCommand::new()),
        profiles: Arc::new(MockProfileCommand::new()),
        profiles_query: Arc::new(MockProfileQuery::new()),
        startups: Arc::new(MockStartupCommand::new()),
        startups_query: Arc::new(MockStartupQuery::new()),
        payments: Arc::new(MockPaymentCommand::new()),
        payments_query: Arc::new(MockPaymentQuery::new()),
        messaging: Arc::new(MockMessagingCommand::new()),
        messaging_query: Arc::new(MockMessagingQuery::new()),
        roadmap: Arc::new(MockRoadmapCommand::new()),
        roadmap_query: Arc::new(MockRoadmapQuery::new()),
        blog: Arc::new(MockBlogCommand::new()),
        blog_query: Arc::new(MockBlogQuery::new()),
        forum: Arc::new(MockForumCommand::new()),
        forum_query: Arc::new(MockForumQuery::new()),
        assistant: Arc::new(MockAssistantChat::new()),
    }
}

/// Full API application backed by `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(routes::configure),
        )
}
