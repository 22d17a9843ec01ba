//! Driving ports for profiles.

use async_trait::async_trait;

use crate::domain::{
    Caller, Error, Page, PageRequest, ProfileFilter, ProfileInput, ProfileView, UserId,
};

/// Profile mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Replace the caller's own profile.
    async fn upsert(&self, caller: &Caller, input: &ProfileInput) -> Result<ProfileView, Error>;
}

/// Profile reads, with field visibility applied for the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    async fn get(&self, caller: &Caller, user: &UserId) -> Result<ProfileView, Error>;

    async fn discover(
        &self,
        caller: &Caller,
        filter: &ProfileFilter,
        page: PageRequest,
    ) -> Result<Page<ProfileView>, Error>;
}
