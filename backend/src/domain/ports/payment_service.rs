//! Driving ports for payments.

use async_trait::async_trait;

use crate::domain::{
    Caller, Error, Page, PageRequest, PaymentOutcome, PaymentRequest, SettlementOutcome,
    Transaction, TransactionId,
};

/// Payment mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Record a payment from the caller, or replay the one already recorded
    /// under the same idempotency key.
    async fn send(
        &self,
        caller: &Caller,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, Error>;

    /// Settle a pending payment; administrators only.
    async fn settle(
        &self,
        caller: &Caller,
        id: &TransactionId,
        outcome: SettlementOutcome,
    ) -> Result<Transaction, Error>;
}

/// Payment reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentQuery: Send + Sync {
    /// Payments the caller sent or received, newest first.
    async fn list(&self, caller: &Caller, page: PageRequest) -> Result<Page<Transaction>, Error>;

    /// One payment, visible to its participants and administrators.
    async fn get(&self, caller: &Caller, id: &TransactionId) -> Result<Transaction, Error>;
}
