//! Driving port for user-facing account queries.
//!
//! Inbound adapters (HTTP handlers) use this port to fetch user-visible data
//! without importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Caller, Error, Page, PageRequest, User};

/// Domain use-case port for reading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// The caller's own account.
    async fn current_user(&self, caller: &Caller) -> Result<User, Error>;

    /// Every account; administrators only.
    async fn list_users(&self, caller: &Caller, page: PageRequest) -> Result<Page<User>, Error>;
}
