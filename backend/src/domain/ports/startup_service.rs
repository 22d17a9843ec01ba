//! Driving ports for startups and team invites.

use async_trait::async_trait;

use crate::domain::{
    Caller, Error, InviteId, IssuedInvite, NewStartup, Startup, StartupId, StartupMember,
    TeamInvite,
};

/// Startup and invite mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StartupCommand: Send + Sync {
    /// Create a startup owned by the caller; founders and administrators only.
    async fn create(&self, caller: &Caller, startup: &NewStartup) -> Result<Startup, Error>;

    /// Invite `email` to join; owners only. The token is returned once.
    async fn invite(
        &self,
        caller: &Caller,
        startup: &StartupId,
        email: &str,
    ) -> Result<IssuedInvite, Error>;

    /// Accept an invite addressed to the caller's email.
    async fn accept_invite(&self, caller: &Caller, token: &str) -> Result<StartupMember, Error>;

    /// Revoke a pending invite; owners only.
    async fn revoke_invite(&self, caller: &Caller, invite: &InviteId) -> Result<TeamInvite, Error>;
}

/// Startup reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StartupQuery: Send + Sync {
    async fn get(&self, caller: &Caller, id: &StartupId) -> Result<Startup, Error>;

    /// Startups the caller belongs to.
    async fn mine(&self, caller: &Caller) -> Result<Vec<Startup>, Error>;

    /// Team list; members and administrators only.
    async fn members(&self, caller: &Caller, id: &StartupId) -> Result<Vec<StartupMember>, Error>;
}
