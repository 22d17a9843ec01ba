//! PostgreSQL-backed `StartupRepository` implementation using Diesel ORM.
//!
//! Startup creation and invite acceptance each touch two tables and run in
//! a transaction so membership never drifts from ownership or invite state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{StartupRepository, StartupRepositoryError};
use crate::domain::{
    InviteId, InviteStatus, Startup, StartupId, StartupMember, StartupStage, TeamInvite, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{InviteRow, NewMemberRow, StartupRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{startup_members, startups, team_invites, users};

type MemberRow = (Uuid, String, String, DateTime<Utc>);

/// Diesel-backed implementation of the startup repository port.
#[derive(Clone)]
pub struct DieselStartupRepository {
    pool: DbPool,
}

impl DieselStartupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StartupRepositoryError {
    map_basic_pool_error(error, StartupRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> StartupRepositoryError {
    map_basic_diesel_error(
        error,
        StartupRepositoryError::query,
        StartupRepositoryError::connection,
    )
}

fn row_to_startup(row: StartupRow) -> Result<Startup, StartupRepositoryError> {
    let stage = row_decoding::parse_column::<StartupStage>("stage", &row.stage)
        .map_err(StartupRepositoryError::query)?;
    Ok(Startup {
        id: StartupId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        name: row.name,
        tagline: row.tagline,
        stage,
        created_at: row.created_at,
    })
}

fn startup_to_row(startup: &Startup) -> StartupRow {
    StartupRow {
        id: *startup.id.as_uuid(),
        owner_id: *startup.owner_id.as_uuid(),
        name: startup.name.clone(),
        tagline: startup.tagline.clone(),
        stage: startup.stage.as_str().to_owned(),
        created_at: startup.created_at,
    }
}

fn row_to_member(row: MemberRow) -> Result<StartupMember, StartupRepositoryError> {
    let (user_id, display_name, role, joined_at) = row;
    Ok(StartupMember {
        user_id: UserId::from_uuid(user_id),
        display_name: row_decoding::display_name(display_name)
            .map_err(StartupRepositoryError::query)?,
        role: row_decoding::role(&role).map_err(StartupRepositoryError::query)?,
        joined_at,
    })
}

fn row_to_invite(row: InviteRow) -> Result<TeamInvite, StartupRepositoryError> {
    let status = row_decoding::parse_column::<InviteStatus>("invite status", &row.status)
        .map_err(StartupRepositoryError::query)?;
    Ok(TeamInvite {
        id: InviteId::from_uuid(row.id),
        startup_id: StartupId::from_uuid(row.startup_id),
        inviter_id: UserId::from_uuid(row.inviter_id),
        email: row_decoding::email(&row.email).map_err(StartupRepositoryError::query)?,
        token_hash: row.token_hash,
        status,
        expires_at: row.expires_at,
        created_at: row.created_at,
    })
}

fn invite_to_row(invite: &TeamInvite) -> InviteRow {
    InviteRow {
        id: *invite.id.as_uuid(),
        startup_id: *invite.startup_id.as_uuid(),
        inviter_id: *invite.inviter_id.as_uuid(),
        email: invite.email.as_ref().to_owned(),
        token_hash: invite.token_hash.clone(),
        status: invite.status.as_str().to_owned(),
        expires_at: invite.expires_at,
        created_at: invite.created_at,
    }
}

#[async_trait]
impl StartupRepository for DieselStartupRepository {
    async fn create(&self, startup: &Startup) -> Result<(), StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = startup_to_row(startup);
        let owner = NewMemberRow {
            startup_id: row.id,
            user_id: row.owner_id,
            joined_at: row.created_at,
        };

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(startups::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(startup_members::table)
                    .values(&owner)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find(&self, id: &StartupId) -> Result<Option<Startup>, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = startups::table
            .find(*id.as_uuid())
            .select(StartupRow::as_select())
            .first::<StartupRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_startup).transpose()
    }

    async fn list_for_member(
        &self,
        user: &UserId,
    ) -> Result<Vec<Startup>, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<StartupRow> = startups::table
            .inner_join(startup_members::table)
            .filter(startup_members::user_id.eq(*user.as_uuid()))
            .select(StartupRow::as_select())
            .order((startups::created_at.desc(), startups::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_startup).collect()
    }

    async fn list_members(
        &self,
        id: &StartupId,
    ) -> Result<Vec<StartupMember>, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MemberRow> = startup_members::table
            .inner_join(users::table)
            .filter(startup_members::startup_id.eq(*id.as_uuid()))
            .select((
                users::id,
                users::display_name,
                users::role,
                startup_members::joined_at,
            ))
            .order((startup_members::joined_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_member).collect()
    }

    async fn is_member(
        &self,
        id: &StartupId,
        user: &UserId,
    ) -> Result<bool, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            startup_members::table.find((*id.as_uuid(), *user.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn create_invite(&self, invite: &TeamInvite) -> Result<(), StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(team_invites::table)
            .values(&invite_to_row(invite))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<TeamInvite>, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = team_invites::table
            .find(*id.as_uuid())
            .select(InviteRow::as_select())
            .first::<InviteRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_invite).transpose()
    }

    async fn find_invite_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<TeamInvite>, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = team_invites::table
            .filter(team_invites::token_hash.eq(token_hash))
            .select(InviteRow::as_select())
            .first::<InviteRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_invite).transpose()
    }

    async fn accept_invite(
        &self,
        id: &InviteId,
        user: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let invite_id = *id.as_uuid();
        let user_id = *user.as_uuid();

        conn.transaction(|conn| {
            async move {
                let accepted: Option<Uuid> = diesel::update(
                    team_invites::table
                        .find(invite_id)
                        .filter(team_invites::status.eq(InviteStatus::Pending.as_str())),
                )
                .set(team_invites::status.eq(InviteStatus::Accepted.as_str()))
                .returning(team_invites::startup_id)
                .get_result(conn)
                .await
                .optional()?;
                let Some(startup_id) = accepted else {
                    return Ok(false);
                };
                diesel::insert_into(startup_members::table)
                    .values(&NewMemberRow {
                        startup_id,
                        user_id,
                        joined_at: at,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn revoke_invite(&self, id: &InviteId) -> Result<bool, StartupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            team_invites::table
                .find(*id.as_uuid())
                .filter(team_invites::status.eq(InviteStatus::Pending.as_str())),
        )
        .set(team_invites::status.eq(InviteStatus::Revoked.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
