//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler annotated with `#[utoipa::path]` and the
//! schema mirrors from [`crate::inbound::http::schemas`], keeping domain
//! types free of utoipa derives.
//!
//! The document is served at `/api/v1/docs/openapi.json`, rendered by
//! Swagger UI in debug builds, and printed by the `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{
    ApiKeySummarySchema, BlogPostPageSchema, BlogPostSchema, ChatMessageSchema,
    ConversationPageSchema, ConversationSchema, CreatedApiKeySchema, ErrorCodeSchema,
    ErrorSchema, FeatureRequestPageSchema, FeatureRequestSchema, IssuedInviteSchema,
    MessagePageSchema, MessageSchema, ProfilePageSchema, ProfileViewSchema, ReplySchema,
    RoundOutcomeSchema, StartupMemberSchema, StartupSchema, TeamInviteSchema,
    ThreadDetailSchema, ThreadPageSchema, ThreadSchema, TransactionPageSchema,
    TransactionSchema, UserPageSchema, UserSchema,
};
use crate::inbound::http::{
    accounts, api_keys, assistant, blog, equity, forum, health, messaging, payments, profiles,
    roadmap, startups,
};

/// Security scheme names referenced by operations.
pub const SESSION_COOKIE_SCHEME: &str = "SessionCookie";
pub const BEARER_API_KEY_SCHEME: &str = "BearerApiKey";

/// Register the session cookie and API key schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            SESSION_COOKIE_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
        components.add_security_scheme(
            BEARER_API_KEY_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DFDS.io API",
        description = "Founders, developers and investors: accounts, startups, payments, \
                       messaging, roadmap voting, blog, threads and funding tools."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("BearerApiKey" = [])),
    paths(
        accounts::register,
        accounts::login,
        accounts::logout,
        accounts::current_user,
        accounts::list_users,
        api_keys::create_api_key,
        api_keys::list_api_keys,
        api_keys::revoke_api_key,
        profiles::upsert_profile,
        profiles::discover_profiles,
        profiles::get_profile,
        startups::create_startup,
        startups::my_startups,
        startups::get_startup,
        startups::list_members,
        startups::invite_member,
        startups::accept_invite,
        startups::revoke_invite,
        payments::send_payment,
        payments::list_payments,
        payments::get_payment,
        payments::settle_payment,
        messaging::start_conversation,
        messaging::list_conversations,
        messaging::list_messages,
        messaging::send_message,
        messaging::signal_typing,
        roadmap::create_feature,
        roadmap::list_features,
        roadmap::vote,
        roadmap::remove_vote,
        roadmap::set_status,
        blog::list_posts,
        blog::get_post,
        blog::create_post,
        blog::update_post,
        blog::publish_post,
        forum::list_threads,
        forum::get_thread,
        forum::create_thread,
        forum::reply,
        forum::delete_thread,
        equity::calculate,
        assistant::chat,
        health::ready,
        health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        UserPageSchema,
        ProfileViewSchema,
        ProfilePageSchema,
        StartupSchema,
        StartupMemberSchema,
        TeamInviteSchema,
        IssuedInviteSchema,
        TransactionSchema,
        TransactionPageSchema,
        ApiKeySummarySchema,
        CreatedApiKeySchema,
        ConversationSchema,
        ConversationPageSchema,
        MessageSchema,
        MessagePageSchema,
        FeatureRequestSchema,
        FeatureRequestPageSchema,
        BlogPostSchema,
        BlogPostPageSchema,
        ThreadSchema,
        ThreadPageSchema,
        ThreadDetailSchema,
        ReplySchema,
        ChatMessageSchema,
        RoundOutcomeSchema,
    )),
    tags(
        (name = "accounts", description = "Registration, login and the current user"),
        (name = "api-keys", description = "Programmatic credentials"),
        (name = "profiles", description = "Member profiles and discovery"),
        (name = "startups", description = "Startups, teams and invites"),
        (name = "payments", description = "Idempotent peer payments"),
        (name = "messaging", description = "Direct conversations"),
        (name = "roadmap", description = "Feature requests and voting"),
        (name = "blog", description = "Published articles"),
        (name = "threads", description = "Community discussion"),
        (name = "equity", description = "Funding round calculator"),
        (name = "assistant", description = "AI help desk"),
        (name = "admin", description = "Administrator operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const TRANSACTION_SCHEMA_NAME: &str = "crate.domain.Transaction";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_envelope_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        for field in ["code", "message", "traceId", "details"] {
            assert_object_schema_has_field(error_schema, field);
        }
    }

    #[test]
    fn transaction_schema_uses_wire_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(TRANSACTION_SCHEMA_NAME).expect("Transaction schema");

        assert_object_schema_has_field(schema, "amountCents");
        assert_object_schema_has_field(schema, "idempotencyKey");
    }

    #[test]
    fn both_security_schemes_are_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(SESSION_COOKIE_SCHEME));
        assert!(components.security_schemes.contains_key(BEARER_API_KEY_SCHEME));
    }

    #[test]
    fn every_feature_area_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/login",
            "/api/v1/payments",
            "/api/v1/api-keys",
            "/api/v1/startups/{id}/invites",
            "/api/v1/conversations/{id}/messages",
            "/api/v1/roadmap/features/{id}/vote",
            "/api/v1/blog/posts/{slug}",
            "/api/v1/threads/{id}/replies",
            "/api/v1/equity/calculate",
            "/api/v1/assistant/chat",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
