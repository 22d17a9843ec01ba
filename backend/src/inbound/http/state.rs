//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ApiKeyAuthenticator, ApiKeyCommand, AssistantChat, BlogCommand, BlogQuery, ForumCommand,
    ForumQuery, LoginService, MessagingCommand, MessagingQuery, PaymentCommand, PaymentQuery,
    ProfileCommand, ProfileQuery, RegistrationService, RoadmapCommand, RoadmapQuery,
    StartupCommand, StartupQuery, UsersQuery,
};

/// Account and credential ports.
#[derive(Clone)]
pub struct AccountPorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UsersQuery>,
    pub api_key_auth: Arc<dyn ApiKeyAuthenticator>,
    pub api_keys: Arc<dyn ApiKeyCommand>,
}

/// Feature ports consumed by the remaining handlers.
#[derive(Clone)]
pub struct FeaturePorts {
    pub profiles: Arc<dyn ProfileCommand>,
    pub profiles_query: Arc<dyn ProfileQuery>,
    pub startups: Arc<dyn StartupCommand>,
    pub startups_query: Arc<dyn StartupQuery>,
    pub payments: Arc<dyn PaymentCommand>,
    pub payments_query: Arc<dyn PaymentQuery>,
    pub messaging: Arc<dyn MessagingCommand>,
    pub messaging_query: Arc<dyn MessagingQuery>,
    pub roadmap: Arc<dyn RoadmapCommand>,
    pub roadmap_query: Arc<dyn RoadmapQuery>,
    pub blog: Arc<dyn BlogCommand>,
    pub blog_query: Arc<dyn BlogQuery>,
    pub forum: Arc<dyn ForumCommand>,
    pub forum_query: Arc<dyn ForumQuery>,
    pub assistant: Arc<dyn AssistantChat>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UsersQuery>,
    pub api_key_auth: Arc<dyn ApiKeyAuthenticator>,
    pub api_keys: Arc<dyn ApiKeyCommand>,
    pub profiles: Arc<dyn ProfileCommand>,
    pub profiles_query: Arc<dyn ProfileQuery>,
    pub startups: Arc<dyn StartupCommand>,
    pub startups_query: Arc<dyn StartupQuery>,
    pub payments: Arc<dyn PaymentCommand>,
    pub payments_query: Arc<dyn PaymentQuery>,
    pub messaging: Arc<dyn MessagingCommand>,
    pub messaging_query: Arc<dyn MessagingQuery>,
    pub roadmap: Arc<dyn RoadmapCommand>,
    pub roadmap_query: Arc<dyn RoadmapQuery>,
    pub blog: Arc<dyn BlogCommand>,
    pub blog_query: Arc<dyn BlogQuery>,
    pub forum: Arc<dyn ForumCommand>,
    pub forum_query: Arc<dyn ForumQuery>,
    pub assistant: Arc<dyn AssistantChat>,
}

impl HttpState {
    /// Construct state from the account and feature port bundles.
    pub fn new(accounts: AccountPorts, features: FeaturePorts) -> Self {
        let AccountPorts {
            login,
            registration,
            users,
            api_key_auth,
            api_keys,
        } = accounts;
        let FeaturePorts {
            profiles,
            profiles_query,
            startups,
            startups_query,
            payments,
            payments_query,
            messaging,
            messaging_query,
            roadmap,
            roadmap_query,
            blog,
            blog_query,
            forum,
            forum_query,
            assistant,
        } = features;
        Self {
            login,
            registration,
            users,
            api_key_auth,
            api_keys,
            profiles,
            profiles_query,
            startups,
            startups_query,
            payments,
            payments_query,
            messaging,
            messaging_query,
            roadmap,
            roadmap_query,
            blog,
            blog_query,
            forum,
            forum_query,
            assistant,
        }
    }
}
