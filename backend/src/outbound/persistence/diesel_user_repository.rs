//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Emails are stored in their normalised (lowercase) form, so lookups compare
//! directly against the unique `lower(email)` index.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{Email, Page, PageRequest, PasswordHash, User, UserId};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_conflicting_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_conflicting_diesel_error(
        error,
        || UserPersistenceError::query("unexpected unique constraint violation"),
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a validated domain user and its hash.
fn row_to_credentials(row: UserRow) -> Result<StoredCredentials, UserPersistenceError> {
    let UserRow {
        id,
        email,
        display_name,
        role,
        password_hash,
        created_at,
    } = row;
    let user = User::new(
        UserId::from_uuid(id),
        row_decoding::display_name(display_name).map_err(UserPersistenceError::query)?,
        row_decoding::email(&email).map_err(UserPersistenceError::query)?,
        row_decoding::role(&role).map_err(UserPersistenceError::query)?,
        created_at,
    );
    Ok(StoredCredentials {
        user,
        password_hash: PasswordHash::from_stored(password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_credentials(row).map(|stored| stored.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            password_hash: password_hash.as_str(),
            created_at: user.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                map_conflicting_diesel_error(
                    error,
                    || UserPersistenceError::duplicate_email(user.email().as_ref()),
                    UserPersistenceError::query,
                    UserPersistenceError::connection,
                )
            })
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order((users::created_at.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }
}
