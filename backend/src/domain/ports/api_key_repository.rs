//! Port for API key persistence.
//!
//! Adapters never see plaintext tokens: records carry the lookup prefix and
//! the SHA-256 digest only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ApiKeyId, ApiKeyRecord, KeyPrefix, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by API key repository adapters.
    pub enum ApiKeyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "api key repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "api key repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Store a newly minted key.
    async fn insert(&self, record: &ApiKeyRecord) -> Result<(), ApiKeyRepositoryError>;

    /// Every key sharing `prefix`, including revoked and expired ones.
    ///
    /// The owner's current role is joined in.
    async fn find_by_prefix(
        &self,
        prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeyRecord>, ApiKeyRepositoryError>;

    /// Keys owned by `owner`, newest first.
    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ApiKeyRecord>, ApiKeyRepositoryError>;

    /// Mark `id` revoked if `owner` owns it and it is not already revoked.
    ///
    /// Returns the key as stored afterwards, or `None` when `owner` has no key
    /// with this id.
    async fn revoke(
        &self,
        owner: &UserId,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRecord>, ApiKeyRepositoryError>;

    /// Record a successful authentication.
    async fn touch_last_used(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<(), ApiKeyRepositoryError>;
}
