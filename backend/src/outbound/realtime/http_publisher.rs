//! Reqwest-backed realtime publisher.
//!
//! Events are POSTed as JSON to `<endpoint>/events`. The hosted service fans
//! them out to subscribed browsers; this adapter never waits for delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::domain::RealtimeEvent;
use crate::domain::ports::{RealtimePublishError, RealtimePublisher};

const EVENTS_PATH: &str = "events";

#[derive(Debug, Serialize)]
struct EventBody<'a> {
    channel: &'a str,
    name: &'a str,
    data: &'a Value,
}

/// Publisher that triggers events on the hosted pub/sub HTTP API.
pub struct HttpRealtimePublisher {
    client: Client,
    events_url: Url,
    api_key: Option<String>,
}

impl HttpRealtimePublisher {
    /// Build a publisher for `endpoint` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot host the events path or the
    /// reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RealtimePublishError> {
        let events_url = events_url(endpoint)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RealtimePublishError::transport(err.to_string()))?;
        Ok(Self {
            client,
            events_url,
            api_key,
        })
    }
}

fn events_url(mut endpoint: Url) -> Result<Url, RealtimePublishError> {
    if !endpoint.path().ends_with('/') {
        let path = format!("{}/", endpoint.path());
        endpoint.set_path(&path);
    }
    endpoint.join(EVENTS_PATH).map_err(|err| {
        RealtimePublishError::transport(format!("invalid realtime endpoint: {err}"))
    })
}

#[async_trait]
impl RealtimePublisher for HttpRealtimePublisher {
    async fn publish(&self, event: &RealtimeEvent) -> Result<(), RealtimePublishError> {
        let body = EventBody {
            channel: &event.channel,
            name: event.name,
            data: &event.payload,
        };
        let mut request = self.client.post(self.events_url.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RealtimePublishError::transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RealtimePublishError::rejected(status.as_u16()));
        }
        tracing::debug!(channel = %event.channel, event = event.name, "realtime event published");
        Ok(())
    }
}
