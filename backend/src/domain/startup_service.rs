//! Startup and team invite domain service.
//!
//! Invite tokens are shown once to the inviter and stored only as a SHA-256
//! digest. Acceptance is bound to the invited email address.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    StartupCommand, StartupQuery, StartupRepository, StartupRepositoryError, UserRepository,
};
use crate::domain::{
    Caller, Email, Error, InviteId, InviteStatus, InviteToken, IssuedInvite, NewStartup,
    Permission, Role, Startup, StartupId, StartupMember, TeamInvite,
};

/// Startup service implementing the startup driving ports.
#[derive(Clone)]
pub struct StartupService<S, U> {
    startups: Arc<S>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<S, U> StartupService<S, U> {
    pub fn new(startups: Arc<S>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            startups,
            users,
            clock,
        }
    }
}

impl<S, U> StartupService<S, U>
where
    S: StartupRepository,
    U: UserRepository,
{
    fn map_startup_error(error: StartupRepositoryError) -> Error {
        match error {
            StartupRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("startup repository unavailable: {message}"))
            }
            StartupRepositoryError::Query { message } => {
                Error::internal(format!("startup repository error: {message}"))
            }
        }
    }

    async fn load(&self, id: &StartupId) -> Result<Startup, Error> {
        self.startups
            .find(id)
            .await
            .map_err(Self::map_startup_error)?
            .ok_or_else(|| Error::not_found("startup not found"))
    }

    async fn load_owned(&self, caller: &Caller, id: &StartupId) -> Result<Startup, Error> {
        let startup = self.load(id).await?;
        if &startup.owner_id == caller.user_id() || caller.is_admin() {
            Ok(startup)
        } else {
            Err(Error::forbidden("only the startup owner may manage invites"))
        }
    }
}

#[async_trait]
impl<S, U> StartupCommand for StartupService<S, U>
where
    S: StartupRepository,
    U: UserRepository,
{
    async fn create(&self, caller: &Caller, request: &NewStartup) -> Result<Startup, Error> {
        caller.require(Permission::Write)?;
        if caller.role() != Role::Founder && !caller.is_admin() {
            return Err(Error::forbidden("only founders may create startups"));
        }
        let startup = Startup {
            id: StartupId::random(),
            owner_id: caller.user_id().clone(),
            name: request.name.clone(),
            tagline: request.tagline.clone(),
            stage: request.stage,
            created_at: self.clock.utc(),
        };
        self.startups
            .create(&startup)
            .await
            .map_err(Self::map_startup_error)?;
        tracing::info!(startup_id = %startup.id, "startup created");
        Ok(startup)
    }

    async fn invite(
        &self,
        caller: &Caller,
        startup: &StartupId,
        email: &str,
    ) -> Result<IssuedInvite, Error> {
        caller.require(Permission::Write)?;
        let email = Email::new(email)
            .map_err(|err| Error::invalid_field("email", "invalid", err.to_string()))?;
        let startup = self.load_owned(caller, startup).await?;

        let token = InviteToken::generate();
        let invite = TeamInvite::issue(
            startup.id,
            caller.user_id().clone(),
            email,
            &token,
            self.clock.utc(),
        );
        self.startups
            .create_invite(&invite)
            .await
            .map_err(Self::map_startup_error)?;
        tracing::info!(invite_id = %invite.id, startup_id = %startup.id, "team invite issued");
        Ok(IssuedInvite {
            invite,
            token: token.expose().to_owned(),
        })
    }

    async fn accept_invite(&self, caller: &Caller, token: &str) -> Result<StartupMember, Error> {
        caller.require(Permission::Write)?;
        let not_found = || Error::not_found("invite not found");
        let token = InviteToken::from_presented(token).ok_or_else(not_found)?;
        let invite = self
            .startups
            .find_invite_by_token_hash(&token.hash_hex())
            .await
            .map_err(Self::map_startup_error)?
            .ok_or_else(not_found)?;

        let user = self
            .users
            .find_by_id(caller.user_id())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        if user.email() != &invite.email {
            return Err(Error::forbidden("invite was issued to a different email"));
        }
        let now = self.clock.utc();
        if invite.status != InviteStatus::Pending {
            return Err(Error::conflict(format!(
                "invite is {}",
                invite.status.as_str().to_lowercase()
            )));
        }
        if invite.is_expired(now) {
            return Err(Error::conflict("invite has expired"));
        }
        if self
            .startups
            .is_member(&invite.startup_id, caller.user_id())
            .await
            .map_err(Self::map_startup_error)?
        {
            return Err(Error::conflict("already a member of this startup"));
        }

        let accepted = self
            .startups
            .accept_invite(&invite.id, caller.user_id(), now)
            .await
            .map_err(Self::map_startup_error)?;
        if !accepted {
            return Err(Error::conflict("invite is no longer pending"));
        }
        tracing::info!(invite_id = %invite.id, startup_id = %invite.startup_id, "invite accepted");
        Ok(StartupMember {
            user_id: user.id().clone(),
            display_name: user.display_name().clone(),
            role: user.role(),
            joined_at: now,
        })
    }

    async fn revoke_invite(&self, caller: &Caller, id: &InviteId) -> Result<TeamInvite, Error> {
        caller.require(Permission::Write)?;
        let mut invite = self
            .startups
            .find_invite(id)
            .await
            .map_err(Self::map_startup_error)?
            .ok_or_else(|| Error::not_found("invite not found"))?;
        self.load_owned(caller, &invite.startup_id).await?;

        let revoked = invite.status == InviteStatus::Pending
            && self
                .startups
                .revoke_invite(id)
                .await
                .map_err(Self::map_startup_error)?;
        if !revoked {
            return Err(Error::conflict("only pending invites can be revoked"));
        }
        invite.status = InviteStatus::Revoked;
        Ok(invite)
    }
}

#[async_trait]
impl<S, U> StartupQuery for StartupService<S, U>
where
    S: StartupRepository,
    U: UserRepository,
{
    async fn get(&self, caller: &Caller, id: &StartupId) -> Result<Startup, Error> {
        caller.require(Permission::Read)?;
        self.load(id).await
    }

    async fn mine(&self, caller: &Caller) -> Result<Vec<Startup>, Error> {
        caller.require(Permission::Read)?;
        self.startups
            .list_for_member(caller.user_id())
            .await
            .map_err(Self::map_startup_error)
    }

    async fn members(&self, caller: &Caller, id: &StartupId) -> Result<Vec<StartupMember>, Error> {
        caller.require(Permission::Read)?;
        self.load(id).await?;
        let is_member = self
            .startups
            .is_member(id, caller.user_id())
            .await
            .map_err(Self::map_startup_error)?;
        if !is_member && !caller.is_admin() {
            return Err(Error::forbidden("only members may view the team"));
        }
        self.startups
            .list_members(id)
            .await
            .map_err(Self::map_startup_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockStartupRepository, MockUserRepository};
    use crate::domain::{ErrorCode, StartupStage, UserId};
    use crate::test_support::{fixture_clock, fixture_timestamp, session_caller, user_with};
    use chrono::Duration;
    use rstest::rstest;

    type Service = StartupService<MockStartupRepository, MockUserRepository>;

    fn service(startups: MockStartupRepository, users: MockUserRepository) -> Service {
        StartupService::new(Arc::new(startups), Arc::new(users), fixture_clock())
    }

    fn startup_owned_by(owner: &UserId) -> Startup {
        Startup {
            id: StartupId::random(),
            owner_id: owner.clone(),
            name: "Acme".to_owned(),
            tagline: None,
            stage: StartupStage::Idea,
            created_at: fixture_timestamp(),
        }
    }

    fn pending_invite(token: &InviteToken, email: &str) -> TeamInvite {
        TeamInvite::issue(
            StartupId::random(),
            UserId::random(),
            Email::new(email).expect("email"),
            token,
            fixture_timestamp() - Duration::days(1),
        )
    }

    fn invitee_lookup(caller: &Caller, email: &str) -> MockUserRepository {
        let user = user_with(caller.user_id(), email, caller.role());
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(user)));
        users
    }

    #[rstest]
    #[case(Role::Developer)]
    #[case(Role::Investor)]
    #[tokio::test]
    async fn only_founders_create_startups(#[case] role: Role) {
        let mut startups = MockStartupRepository::new();
        startups.expect_create().times(0);
        let request = NewStartup::try_new("Acme", None, StartupStage::Idea).expect("valid");
        let err = service(startups, MockUserRepository::new())
            .create(&session_caller(role), &request)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn founders_create_startups_they_own() {
        let caller = session_caller(Role::Founder);
        let owner = caller.user_id().clone();
        let mut startups = MockStartupRepository::new();
        startups
            .expect_create()
            .withf(move |startup| startup.owner_id == owner)
            .times(1)
            .return_once(|_| Ok(()));
        let request =
            NewStartup::try_new("Acme", Some("Rockets"), StartupStage::Seed).expect("valid");

        let startup = service(startups, MockUserRepository::new())
            .create(&caller, &request)
            .await
            .expect("created");
        assert_eq!(startup.stage, StartupStage::Seed);
    }

    #[rstest]
    #[tokio::test]
    async fn invite_stores_hash_and_returns_token() {
        let caller = session_caller(Role::Founder);
        let startup = startup_owned_by(caller.user_id());
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find()
            .return_once(move |_| Ok(Some(startup)));
        startups
            .expect_create_invite()
            .withf(|invite| invite.status == InviteStatus::Pending)
            .times(1)
            .return_once(|_| Ok(()));

        let issued = service(startups, MockUserRepository::new())
            .invite(&caller, &StartupId::random(), "Dev@Example.com")
            .await
            .expect("issued");
        let token = InviteToken::from_presented(&issued.token).expect("well-formed");
        assert_eq!(issued.invite.token_hash, token.hash_hex());
        assert_eq!(issued.invite.email.as_ref(), "dev@example.com");
        assert_eq!(
            issued.invite.expires_at,
            fixture_timestamp() + Duration::days(7)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn non_owners_cannot_invite() {
        let startup = startup_owned_by(&UserId::random());
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find()
            .return_once(move |_| Ok(Some(startup)));
        startups.expect_create_invite().times(0);

        let err = service(startups, MockUserRepository::new())
            .invite(
                &session_caller(Role::Founder),
                &StartupId::random(),
                "dev@example.com",
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn accepting_adds_membership() {
        let caller = session_caller(Role::Developer);
        let token = InviteToken::generate();
        let invite = pending_invite(&token, "dev@example.com");
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find_invite_by_token_hash()
            .withf({
                let hash = token.hash_hex();
                move |candidate| candidate == hash
            })
            .return_once(move |_| Ok(Some(invite)));
        startups.expect_is_member().return_once(|_, _| Ok(false));
        startups
            .expect_accept_invite()
            .times(1)
            .return_once(|_, _, _| Ok(true));

        let member = service(startups, invitee_lookup(&caller, "dev@example.com"))
            .accept_invite(&caller, token.expose())
            .await
            .expect("accepted");
        assert_eq!(&member.user_id, caller.user_id());
        assert_eq!(member.joined_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn accepting_with_another_email_is_forbidden() {
        let caller = session_caller(Role::Developer);
        let token = InviteToken::generate();
        let invite = pending_invite(&token, "someone@example.com");
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find_invite_by_token_hash()
            .return_once(move |_| Ok(Some(invite)));
        startups.expect_accept_invite().times(0);

        let err = service(startups, invitee_lookup(&caller, "dev@example.com"))
            .accept_invite(&caller, token.expose())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case::revoked(InviteStatus::Revoked, 0)]
    #[case::expired(InviteStatus::Pending, 8)]
    #[tokio::test]
    async fn stale_invites_conflict(#[case] status: InviteStatus, #[case] age_days: i64) {
        let caller = session_caller(Role::Developer);
        let token = InviteToken::generate();
        let mut invite = TeamInvite::issue(
            StartupId::random(),
            UserId::random(),
            Email::new("dev@example.com").expect("email"),
            &token,
            fixture_timestamp() - Duration::days(age_days),
        );
        invite.status = status;
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find_invite_by_token_hash()
            .return_once(move |_| Ok(Some(invite)));
        startups.expect_accept_invite().times(0);

        let err = service(startups, invitee_lookup(&caller, "dev@example.com"))
            .accept_invite(&caller, token.expose())
            .await
            .expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn garbage_token_is_not_found() {
        let mut startups = MockStartupRepository::new();
        startups.expect_find_invite_by_token_hash().times(0);
        let err = service(startups, MockUserRepository::new())
            .accept_invite(&session_caller(Role::Developer), "nope")
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn owner_revokes_pending_invite() {
        let caller = session_caller(Role::Founder);
        let startup = startup_owned_by(caller.user_id());
        let invite = pending_invite(&InviteToken::generate(), "dev@example.com");
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find_invite()
            .return_once(move |_| Ok(Some(invite)));
        startups
            .expect_find()
            .return_once(move |_| Ok(Some(startup)));
        startups
            .expect_revoke_invite()
            .times(1)
            .return_once(|_| Ok(true));

        let revoked = service(startups, MockUserRepository::new())
            .revoke_invite(&caller, &InviteId::random())
            .await
            .expect("revoked");
        assert_eq!(revoked.status, InviteStatus::Revoked);
    }

    #[rstest]
    #[tokio::test]
    async fn outsiders_cannot_list_members() {
        let startup = startup_owned_by(&UserId::random());
        let mut startups = MockStartupRepository::new();
        startups
            .expect_find()
            .return_once(move |_| Ok(Some(startup)));
        startups.expect_is_member().return_once(|_, _| Ok(false));
        startups.expect_list_members().times(0);

        let err = service(startups, MockUserRepository::new())
            .members(&session_caller(Role::Investor), &StartupId::random())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
