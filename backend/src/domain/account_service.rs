//! Account domain service: registration, login, and account reads.
//!
//! Password hashing and verification run on the blocking pool because Argon2
//! is deliberately expensive.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{
    LoginService, RegistrationService, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    AuthenticatedUser, Caller, Error, LoginCredentials, Page, PageRequest, PasswordHash,
    Registration, User, UserId,
};

/// Account service implementing the login, registration, and users ports.
#[derive(Clone)]
pub struct AccountService<R> {
    users: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R> {
    pub fn new(users: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
        }
    }
}

fn join_error(error: task::JoinError) -> Error {
    Error::internal(format!("password task failed: {error}"))
}

#[async_trait]
impl<R> LoginService for AccountService<R>
where
    R: UserRepository + 'static,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?;

        // Unknown accounts verify against a decoy so both paths cost one
        // Argon2 verification.
        let (hash, user) = match stored {
            Some(found) => (found.password_hash, Some(found.user)),
            None => (PasswordHash::decoy().clone(), None),
        };
        let password = Zeroizing::new(credentials.password().to_owned());
        let verified = task::spawn_blocking(move || hash.verify(&password))
            .await
            .map_err(join_error)?;

        match user {
            Some(user) if verified => Ok(AuthenticatedUser::new(user.id().clone(), user.role())),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}

#[async_trait]
impl<R> RegistrationService for AccountService<R>
where
    R: UserRepository + 'static,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let password = Zeroizing::new(registration.password().to_owned());
        let hash = task::spawn_blocking(move || PasswordHash::hash(&password))
            .await
            .map_err(join_error)?
            .map_err(|err| Error::internal(err.to_string()))?;

        let user = User::new(
            UserId::random(),
            registration.display_name().clone(),
            registration.email().clone(),
            registration.role(),
            self.clock.utc(),
        );
        self.users
            .create(&user, &hash)
            .await
            .map_err(map_user_error)?;
        tracing::info!(user_id = %user.id(), role = %user.role(), "account registered");
        Ok(user)
    }
}

#[async_trait]
impl<R> UsersQuery for AccountService<R>
where
    R: UserRepository + 'static,
{
    async fn current_user(&self, caller: &Caller) -> Result<User, Error> {
        self.users
            .find_by_id(caller.user_id())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("account no longer exists"))
    }

    async fn list_users(&self, caller: &Caller, page: PageRequest) -> Result<Page<User>, Error> {
        caller.require_admin()?;
        self.users.list(page).await.map_err(map_user_error)
    }
}
