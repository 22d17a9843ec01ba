//! Driving ports for API key authentication and management.

use async_trait::async_trait;

use crate::domain::{
    ApiKeyId, ApiKeyPrincipal, ApiKeySummary, Caller, CreatedApiKey, Error, NewApiKey,
};

/// Resolves bearer tokens to principals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyAuthenticator: Send + Sync {
    /// Verify a presented token.
    ///
    /// Malformed, unknown, revoked, and expired tokens all yield
    /// `401 unauthorized`.
    async fn authenticate(&self, presented: &str) -> Result<ApiKeyPrincipal, Error>;
}

/// Owner-facing key management. Only session callers may manage keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyCommand: Send + Sync {
    /// Mint a key; the plaintext token is returned only here.
    async fn create(&self, caller: &Caller, request: &NewApiKey) -> Result<CreatedApiKey, Error>;

    /// The caller's keys, without hashes.
    async fn list(&self, caller: &Caller) -> Result<Vec<ApiKeySummary>, Error>;

    /// Revoke one of the caller's keys. Revoking twice is not an error.
    async fn revoke(&self, caller: &Caller, id: &ApiKeyId) -> Result<ApiKeySummary, Error>;
}
