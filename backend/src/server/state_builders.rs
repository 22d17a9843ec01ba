//! Builders for HTTP state ports and the outbound adapters behind them.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use dfds_backend::domain::ports::{
    ChatCompletion, NoOpRealtimePublisher, RealtimePublisher, UnconfiguredChatCompletion,
};
use dfds_backend::domain::{
    AccountService, ApiKeyService, AssistantChatService, BlogService, FeePolicy, ForumService,
    MessagingService, PaymentService, ProfileService, RoadmapService, StartupService,
};
use dfds_backend::inbound::http::state::{AccountPorts, FeaturePorts, HttpState};
use dfds_backend::outbound::assistant::{OpenAiChatClient, OpenAiChatSettings};
use dfds_backend::outbound::persistence::{
    DbPool, DieselApiKeyRepository, DieselBlogRepository, DieselConversationRepository,
    DieselForumRepository, DieselProfileRepository, DieselRoadmapRepository,
    DieselStartupRepository, DieselTransactionRepository, DieselUserRepository,
};
use dfds_backend::outbound::realtime::HttpRealtimePublisher;

use super::config::{AppSettings, SettingsError};

/// Errors raised while assembling the service graph.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build realtime publisher: {0}")]
    Realtime(String),
    #[error("failed to build assistant client: {0}")]
    Assistant(String),
}

/// Select the realtime publisher for the configured endpoint.
///
/// Without an endpoint, events are logged and dropped.
fn build_realtime_publisher(
    settings: &AppSettings,
) -> Result<Arc<dyn RealtimePublisher>, StateBuildError> {
    match settings.realtime_endpoint()? {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "realtime publishing enabled");
            let publisher = HttpRealtimePublisher::new(
                endpoint,
                settings.realtime_api_key.clone(),
                settings.upstream_timeout(),
            )
            .map_err(|err| StateBuildError::Realtime(err.to_string()))?;
            Ok(Arc::new(publisher))
        }
        None => {
            info!("no realtime endpoint configured; events are dropped");
            Ok(Arc::new(NoOpRealtimePublisher))
        }
    }
}

/// Select the chat completion provider; unconfigured providers answer 503.
fn build_chat_completion(
    settings: &AppSettings,
) -> Result<Arc<dyn ChatCompletion>, StateBuildError> {
    match settings.assistant_endpoint()? {
        Some(endpoint) => {
            info!(model = %endpoint.model, "assistant enabled");
            let client = OpenAiChatClient::new(OpenAiChatSettings {
                endpoint: endpoint.url,
                api_key: endpoint.api_key,
                model: endpoint.model,
                timeout: settings.upstream_timeout(),
            })
            .map_err(|err| StateBuildError::Assistant(err.to_string()))?;
            Ok(Arc::new(client))
        }
        None => Ok(Arc::new(UnconfiguredChatCompletion)),
    }
}

/// Wire every domain service against the shared pool.
///
/// Repositories are cloned cheaply (they hold the pool handle), so services
/// that need the same table share one `Arc`.
pub fn build_http_state(pool: &DbPool, settings: &AppSettings) -> Result<HttpState, StateBuildError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let publisher = build_realtime_publisher(settings)?;
    let completion = build_chat_completion(settings)?;

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let accounts = Arc::new(AccountService::new(users.clone(), clock.clone()));
    let api_keys = Arc::new(ApiKeyService::new(
        Arc::new(DieselApiKeyRepository::new(pool.clone())),
        clock.clone(),
    ));

    let profiles = Arc::new(ProfileService::new(
        Arc::new(DieselProfileRepository::new(pool.clone())),
        clock.clone(),
    ));
    let startups = Arc::new(StartupService::new(
        Arc::new(DieselStartupRepository::new(pool.clone())),
        users.clone(),
        clock.clone(),
    ));
    let payments = Arc::new(PaymentService::new(
        Arc::new(DieselTransactionRepository::new(pool.clone())),
        users.clone(),
        FeePolicy::flat(settings.flat_fee_cents),
        clock.clone(),
    ));
    let messaging = Arc::new(MessagingService::new(
        Arc::new(DieselConversationRepository::new(pool.clone())),
        users,
        publisher,
        clock.clone(),
    ));
    let roadmap = Arc::new(RoadmapService::new(
        Arc::new(DieselRoadmapRepository::new(pool.clone())),
        clock.clone(),
    ));
    let blog = Arc::new(BlogService::new(
        Arc::new(DieselBlogRepository::new(pool.clone())),
        clock.clone(),
    ));
    let forum = Arc::new(ForumService::new(
        Arc::new(DieselForumRepository::new(pool.clone())),
        clock,
    ));
    let assistant = Arc::new(AssistantChatService::new(completion));

    Ok(HttpState::new(
        AccountPorts {
            login: accounts.clone(),
            registration: accounts.clone(),
            users: accounts,
            api_key_auth: api_keys.clone(),
            api_keys,
        },
        FeaturePorts {
            profiles: profiles.clone(),
            profiles_query: profiles,
            startups: startups.clone(),
            startups_query: startups,
            payments: payments.clone(),
            payments_query: payments,
            messaging: messaging.clone(),
            messaging_query: messaging,
            roadmap: roadmap.clone(),
            roadmap_query: roadmap,
            blog: blog.clone(),
            blog_query: blog,
            forum: forum.clone(),
            forum_query: forum,
            assistant,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use ortho_config::OrthoConfig as _;
    use rstest::rstest;

    fn settings_with(vars: [(&'static str, Option<String>); 4]) -> AppSettings {
        let _guard = lock_env(vars);
        AppSettings::load_from_iter([OsString::from("dfds-backend")]).expect("config should load")
    }

    #[rstest]
    #[tokio::test]
    async fn unconfigured_assistant_answers_not_configured() {
        let settings = settings_with([
            ("DFDS_ASSISTANT_ENDPOINT", None),
            ("DFDS_ASSISTANT_API_KEY", None),
            ("DFDS_REALTIME_ENDPOINT", None),
            ("DFDS_REALTIME_API_KEY", None),
        ]);
        let completion = build_chat_completion(&settings).expect("builds");
        let err = completion.complete(&[]).await.expect_err("unconfigured");
        assert!(matches!(
            err,
            dfds_backend::domain::ports::ChatCompletionError::NotConfigured
        ));
    }

    #[rstest]
    fn invalid_realtime_endpoint_is_reported() {
        let settings = settings_with([
            ("DFDS_ASSISTANT_ENDPOINT", None),
            ("DFDS_ASSISTANT_API_KEY", None),
            ("DFDS_REALTIME_ENDPOINT", Some("::nope::".to_owned())),
            ("DFDS_REALTIME_API_KEY", None),
        ]);
        let Err(err) = build_realtime_publisher(&settings) else {
            panic!("invalid endpoint should fail");
        };
        assert!(matches!(
            err,
            StateBuildError::Settings(SettingsError::InvalidUrl { .. })
        ));
    }
}
