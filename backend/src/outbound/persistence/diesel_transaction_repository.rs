//! PostgreSQL-backed `TransactionRepository` implementation using Diesel ORM.
//!
//! Status changes are compare-and-set updates guarded by the expected current
//! status; a settlement that lost a race simply matches no row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TransactionRepository, TransactionRepositoryError};
use crate::domain::{
    Currency, IdempotencyKey, Page, PageRequest, Transaction, TransactionId, TransactionStatus,
    UserId,
};

use super::diesel_basic_error_mapping::{map_basic_pool_error, map_conflicting_diesel_error};
use super::models::{NewTransactionRow, TransactionRow};
use super::pool::{DbPool, PoolError};
use super::row_decoding;
use super::schema::transactions;

/// Diesel-backed implementation of the transaction repository port.
#[derive(Clone)]
pub struct DieselTransactionRepository {
    pool: DbPool,
}

impl DieselTransactionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TransactionRepositoryError {
    map_basic_pool_error(error, TransactionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TransactionRepositoryError {
    map_conflicting_diesel_error(
        error,
        || TransactionRepositoryError::duplicate_key("idempotency key already used"),
        TransactionRepositoryError::query,
        TransactionRepositoryError::connection,
    )
}

fn row_to_transaction(row: TransactionRow) -> Result<Transaction, TransactionRepositoryError> {
    let idempotency_key = IdempotencyKey::new(row.idempotency_key).map_err(|err| {
        TransactionRepositoryError::query(format!("stored idempotency key invalid: {err}"))
    })?;
    let currency = row_decoding::parse_column::<Currency>("currency", &row.currency)
        .map_err(TransactionRepositoryError::query)?;
    let status = row_decoding::parse_column::<TransactionStatus>("status", &row.status)
        .map_err(TransactionRepositoryError::query)?;

    Ok(Transaction {
        id: TransactionId::from_uuid(row.id),
        idempotency_key,
        sender_id: UserId::from_uuid(row.sender_id),
        recipient_id: UserId::from_uuid(row.recipient_id),
        amount_cents: row.amount_cents,
        fee_cents: row.fee_cents,
        currency,
        description: row.description,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl TransactionRepository for DieselTransactionRepository {
    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<Transaction>, TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = transactions::table
            .filter(transactions::idempotency_key.eq(key.as_ref()))
            .select(TransactionRow::as_select())
            .first::<TransactionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_transaction).transpose()
    }

    async fn insert(&self, transaction: &Transaction) -> Result<(), TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTransactionRow {
            id: *transaction.id.as_uuid(),
            idempotency_key: transaction.idempotency_key.as_ref(),
            sender_id: *transaction.sender_id.as_uuid(),
            recipient_id: *transaction.recipient_id.as_uuid(),
            amount_cents: transaction.amount_cents,
            fee_cents: transaction.fee_cents,
            currency: transaction.currency.as_str(),
            description: transaction.description.as_deref(),
            status: transaction.status.as_str(),
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
        };
        diesel::insert_into(transactions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = transactions::table
            .find(*id.as_uuid())
            .select(TransactionRow::as_select())
            .first::<TransactionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_transaction).transpose()
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Transaction>, TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = row_decoding::limit_offset(page);
        let involves = transactions::sender_id
            .eq(*user.as_uuid())
            .or(transactions::recipient_id.eq(*user.as_uuid()));

        let total: i64 = transactions::table
            .filter(involves.clone())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<TransactionRow> = transactions::table
            .filter(involves)
            .select(TransactionRow::as_select())
            .order((transactions::created_at.desc(), transactions::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_decoding::total(total)))
    }

    async fn transition_status(
        &self,
        id: &TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, TransactionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            transactions::table
                .find(*id.as_uuid())
                .filter(transactions::status.eq(from.as_str())),
        )
        .set((
            transactions::status.eq(to.as_str()),
            transactions::updated_at.eq(at),
        ))
        .returning(TransactionRow::as_returning())
        .get_result::<TransactionRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_transaction).transpose()
    }
}
