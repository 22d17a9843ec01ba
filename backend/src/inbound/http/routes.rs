//! Route table for the `/api/v1` scope.
//!
//! Fixed segments such as `/startups/mine` are registered before the
//! `{id}` patterns they would otherwise be captured by.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::doc::ApiDoc;
use crate::inbound::http::{
    accounts, api_keys, assistant, blog, equity, forum, messaging, payments, profiles, roadmap,
    startups,
};

/// Serve the OpenAPI document.
#[get("/docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Register every API handler on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json)
        // accounts
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::current_user)
        .service(accounts::list_users)
        // api keys
        .service(api_keys::create_api_key)
        .service(api_keys::list_api_keys)
        .service(api_keys::revoke_api_key)
        // profiles
        .service(profiles::upsert_profile)
        .service(profiles::discover_profiles)
        .service(profiles::get_profile)
        // startups
        .service(startups::create_startup)
        .service(startups::my_startups)
        .service(startups::get_startup)
        .service(startups::list_members)
        .service(startups::invite_member)
        .service(startups::accept_invite)
        .service(startups::revoke_invite)
        // payments
        .service(payments::send_payment)
        .service(payments::list_payments)
        .service(payments::get_payment)
        .service(payments::settle_payment)
        // messaging
        .service(messaging::start_conversation)
        .service(messaging::list_conversations)
        .service(messaging::list_messages)
        .service(messaging::send_message)
        .service(messaging::signal_typing)
        // roadmap
        .service(roadmap::create_feature)
        .service(roadmap::list_features)
        .service(roadmap::vote)
        .service(roadmap::remove_vote)
        .service(roadmap::set_status)
        // blog
        .service(blog::list_posts)
        .service(blog::get_post)
        .service(blog::create_post)
        .service(blog::update_post)
        .service(blog::publish_post)
        // threads
        .service(forum::list_threads)
        .service(forum::get_thread)
        .service(forum::create_thread)
        .service(forum::reply)
        .service(forum::delete_thread)
        // tools
        .service(equity::calculate)
        .service(assistant::chat);
}
