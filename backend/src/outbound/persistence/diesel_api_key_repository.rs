//! PostgreSQL-backed `ApiKeyRepository` implementation using Diesel ORM.
//!
//! Records are always read joined to their owner so the caller's role is
//! current even when it changed after the key was issued.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ApiKeyRepository, ApiKeyRepositoryError};
use crate::domain::{ApiKeyId, ApiKeyRecord, KeyHash, KeyPrefix, Permission, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ApiKeyRow, NewApiKeyRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::{api_keys, users};

/// Diesel-backed implementation of the API key repository port.
#[derive(Clone)]
pub struct DieselApiKeyRepository {
    pool: DbPool,
}

impl DieselApiKeyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApiKeyRepositoryError {
    map_basic_pool_error(error, ApiKeyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApiKeyRepositoryError {
    map_basic_diesel_error(
        error,
        ApiKeyRepositoryError::query,
        ApiKeyRepositoryError::connection,
    )
}

fn row_to_record(
    (row, owner_role): (ApiKeyRow, String),
) -> Result<ApiKeyRecord, ApiKeyRepositoryError> {
    let prefix = KeyPrefix::new(row.prefix)
        .map_err(|err| ApiKeyRepositoryError::query(format!("stored key prefix invalid: {err}")))?;
    let key_hash = KeyHash::from_hex(&row.key_hash)
        .map_err(|err| ApiKeyRepositoryError::query(format!("stored key hash invalid: {err}")))?;
    let permission = row_decoding::parse_column::<Permission>("permission", &row.permission)
        .map_err(ApiKeyRepositoryError::query)?;
    let owner_role = row_decoding::role(&owner_role).map_err(ApiKeyRepositoryError::query)?;

    Ok(ApiKeyRecord {
        id: ApiKeyId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        owner_role,
        name: row.name,
        prefix,
        key_hash,
        permission,
        expires_at: row.expires_at,
        revoked_at: row.revoked_at,
        last_used_at: row.last_used_at,
        created_at: row.created_at,
    })
}

fn rows_to_records(
    rows: Vec<(ApiKeyRow, String)>,
) -> Result<Vec<ApiKeyRecord>, ApiKeyRepositoryError> {
    rows.into_iter().map(row_to_record).collect()
}

#[async_trait]
impl ApiKeyRepository for DieselApiKeyRepository {
    async fn insert(&self, record: &ApiKeyRecord) -> Result<(), ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewApiKeyRow {
            id: *record.id.as_uuid(),
            owner_id: *record.owner_id.as_uuid(),
            name: &record.name,
            prefix: record.prefix.as_ref(),
            key_hash: record.key_hash.to_hex(),
            permission: record.permission.as_str(),
            expires_at: record.expires_at,
            created_at: record.created_at,
        };
        diesel::insert_into(api_keys::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_prefix(
        &self,
        prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeyRecord>, ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ApiKeyRow, String)> = api_keys::table
            .inner_join(users::table)
            .filter(api_keys::prefix.eq(prefix.as_ref()))
            .select((ApiKeyRow::as_select(), users::role))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_records(rows)
    }

    async fn list_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ApiKeyRecord>, ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(ApiKeyRow, String)> = api_keys::table
            .inner_join(users::table)
            .filter(api_keys::owner_id.eq(*owner.as_uuid()))
            .select((ApiKeyRow::as_select(), users::role))
            .order((api_keys::created_at.desc(), api_keys::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_records(rows)
    }

    async fn revoke(
        &self,
        owner: &UserId,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<Option<ApiKeyRecord>, ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owned = api_keys::table
            .filter(api_keys::id.eq(*id.as_uuid()))
            .filter(api_keys::owner_id.eq(*owner.as_uuid()));

        // A second revoke keeps the original timestamp.
        diesel::update(owned.clone().filter(api_keys::revoked_at.is_null()))
            .set(api_keys::revoked_at.eq(Some(at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let row: Option<(ApiKeyRow, String)> = owned
            .inner_join(users::table)
            .select((ApiKeyRow::as_select(), users::role))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn touch_last_used(
        &self,
        id: &ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<(), ApiKeyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(api_keys::table.find(*id.as_uuid()))
            .set(api_keys::last_used_at.eq(Some(at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
