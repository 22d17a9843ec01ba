//! Port for payment persistence.
//!
//! The idempotency key column is unique; concurrent inserts with the same key
//! surface as [`TransactionRepositoryError::DuplicateKey`] so the caller can
//! re-read the winning row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    IdempotencyKey, Page, PageRequest, Transaction, TransactionId, TransactionStatus, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by transaction repository adapters.
    pub enum TransactionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "transaction repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "transaction repository query failed: {message}",
        /// A transaction with this idempotency key already exists.
        DuplicateKey { message: String } => "idempotency key already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Look up the transaction created for `key`, whoever sent it.
    async fn find_by_idempotency_key(
        &self,
        key: &IdempotencyKey,
    ) -> Result<Option<Transaction>, TransactionRepositoryError>;

    /// Insert a new transaction.
    async fn insert(&self, transaction: &Transaction) -> Result<(), TransactionRepositoryError>;

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, TransactionRepositoryError>;

    /// Transactions sent or received by `user`, newest first.
    async fn list_for_user(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Page<Transaction>, TransactionRepositoryError>;

    /// Move `id` from `from` to `to` atomically.
    ///
    /// Returns `None` when the row does not exist or is no longer in `from`.
    async fn transition_status(
        &self,
        id: &TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, TransactionRepositoryError>;
}
