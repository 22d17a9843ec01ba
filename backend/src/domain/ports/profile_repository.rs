//! Port for profile persistence and discovery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Page, PageRequest, Profile, ProfileFilter, ProfileUpdate, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "profile repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert or replace the profile owned by `user`.
    async fn upsert(
        &self,
        user: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<(), ProfileRepositoryError>;

    /// Profile of `user`; users without a saved profile yield empty fields.
    ///
    /// Returns `None` only when the user does not exist.
    async fn find(&self, user: &UserId) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Profiles matching `filter`, ordered by display name.
    async fn search(
        &self,
        filter: &ProfileFilter,
        page: PageRequest,
    ) -> Result<Page<Profile>, ProfileRepositoryError>;
}
