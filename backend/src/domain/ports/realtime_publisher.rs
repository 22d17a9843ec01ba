//! Port for fanning events out through the hosted pub/sub service.

use async_trait::async_trait;

use crate::domain::RealtimeEvent;

use super::define_port_error;

define_port_error! {
    /// Errors raised by realtime publisher adapters.
    pub enum RealtimePublishError {
        /// The pub/sub endpoint could not be reached.
        Transport { message: String } => "realtime publish transport failed: {message}",
        /// The pub/sub service rejected the event.
        Rejected { status: u16 } => "realtime publish rejected with status {status}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RealtimePublisher: Send + Sync {
    async fn publish(&self, event: &RealtimeEvent) -> Result<(), RealtimePublishError>;
}

/// Publisher used when no pub/sub service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRealtimePublisher;

#[async_trait]
impl RealtimePublisher for NoOpRealtimePublisher {
    async fn publish(&self, event: &RealtimeEvent) -> Result<(), RealtimePublishError> {
        tracing::debug!(channel = %event.channel, event = event.name, "realtime publishing disabled");
        Ok(())
    }
}
