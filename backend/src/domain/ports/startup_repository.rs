//! Port for startups, memberships, and invites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{InviteId, Startup, StartupId, StartupMember, TeamInvite, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by startup repository adapters.
    pub enum StartupRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "startup repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "startup repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StartupRepository: Send + Sync {
    /// Insert a startup and make its owner the first member.
    async fn create(&self, startup: &Startup) -> Result<(), StartupRepositoryError>;

    async fn find(&self, id: &StartupId) -> Result<Option<Startup>, StartupRepositoryError>;

    /// Startups `user` belongs to, newest first.
    async fn list_for_member(
        &self,
        user: &UserId,
    ) -> Result<Vec<Startup>, StartupRepositoryError>;

    /// Members of `id`, earliest joiner first.
    async fn list_members(
        &self,
        id: &StartupId,
    ) -> Result<Vec<StartupMember>, StartupRepositoryError>;

    async fn is_member(&self, id: &StartupId, user: &UserId) -> Result<bool, StartupRepositoryError>;

    async fn create_invite(&self, invite: &TeamInvite) -> Result<(), StartupRepositoryError>;

    async fn find_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<TeamInvite>, StartupRepositoryError>;

    async fn find_invite_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<TeamInvite>, StartupRepositoryError>;

    /// Mark a pending invite accepted and add `user` as a member in one unit
    /// of work. Returns `false` when the invite was no longer pending.
    async fn accept_invite(
        &self,
        id: &InviteId,
        user: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, StartupRepositoryError>;

    /// Mark a pending invite revoked. Returns `false` when it was not pending.
    async fn revoke_invite(&self, id: &InviteId) -> Result<bool, StartupRepositoryError>;
}
