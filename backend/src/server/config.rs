//! Service settings loaded via OrthoConfig.
//!
//! Every value can come from a `DFDS_`-prefixed environment variable, a
//! configuration file, or a command-line flag. Session cookie toggles are
//! read separately by
//! [`session_settings_from_env`](dfds_backend::inbound::http::session_config::session_settings_from_env).

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No database connection string was supplied.
    #[error("DFDS_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// A configured endpoint is not a valid absolute URL.
    #[error("invalid URL for {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Settings for the HTTP service and its outbound adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DFDS")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Flat fee charged on every payment, in minor units.
    #[ortho_config(default = 100)]
    pub flat_fee_cents: i64,
    /// Base URL of the hosted pub/sub service.
    pub realtime_endpoint: Option<String>,
    /// Bearer token for the pub/sub service.
    pub realtime_api_key: Option<String>,
    /// OpenAI-compatible chat completions URL.
    pub assistant_endpoint: Option<String>,
    /// Bearer token for the chat completion provider.
    pub assistant_api_key: Option<String>,
    /// Model name forwarded to the chat completion provider.
    pub assistant_model: Option<String>,
    /// Timeout applied to every outbound HTTP call, in seconds.
    pub upstream_timeout_secs: Option<u64>,
}

/// Chat completion settings once both the endpoint and key are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantEndpoint {
    pub url: Url,
    pub api_key: String,
    pub model: String,
}

impl AppSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Return the database URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(
            self.upstream_timeout_secs
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        )
    }

    /// Parsed pub/sub endpoint, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the value does not parse.
    pub fn realtime_endpoint(&self) -> Result<Option<Url>, SettingsError> {
        parse_optional_url("DFDS_REALTIME_ENDPOINT", self.realtime_endpoint.as_deref())
    }

    /// Chat completion settings, present only when both the endpoint and the
    /// API key are configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the endpoint does not parse.
    pub fn assistant_endpoint(&self) -> Result<Option<AssistantEndpoint>, SettingsError> {
        let Some(url) =
            parse_optional_url("DFDS_ASSISTANT_ENDPOINT", self.assistant_endpoint.as_deref())?
        else {
            return Ok(None);
        };
        let Some(api_key) = self
            .assistant_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        else {
            tracing::warn!("assistant endpoint configured without an API key; assistant disabled");
            return Ok(None);
        };
        Ok(Some(AssistantEndpoint {
            url,
            api_key: api_key.to_owned(),
            model: self
                .assistant_model
                .clone()
                .unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.to_owned()),
        }))
    }
}

fn parse_optional_url(name: &'static str, raw: Option<&str>) -> Result<Option<Url>, SettingsError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Url::parse(value)
            .map(Some)
            .map_err(|source| SettingsError::InvalidUrl { name, source }),
        None => Ok(None),
    }
}
