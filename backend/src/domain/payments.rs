//! Peer-to-peer payment records.
//!
//! A payment is recorded once per idempotency key. Amounts are integer minor
//! units; the service fee is a flat amount charged on top of the transfer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::idempotency::IdempotencyKey;
use super::ids::uuid_id;
use super::sanitize::sanitize_inline;
use super::user::UserId;

/// Smallest transferable amount in minor units.
pub const AMOUNT_MIN_CENTS: i64 = 1;
/// Largest transferable amount in minor units.
pub const AMOUNT_MAX_CENTS: i64 = 1_000_000_000;
/// Longest description kept after sanitising.
pub const DESCRIPTION_MAX: usize = 280;
/// Flat fee charged when no other fee is configured.
pub const DEFAULT_FLAT_FEE_CENTS: i64 = 100;

/// Supported settlement currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = PaymentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            other => Err(PaymentValidationError::UnsupportedCurrency(other.to_owned())),
        }
    }
}

/// Lifecycle of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("unknown transaction status '{other}'")),
        }
    }
}

/// Terminal state requested by a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementOutcome {
    Completed,
    Failed,
}

impl From<SettlementOutcome> for TransactionStatus {
    fn from(value: SettlementOutcome) -> Self {
        match value {
            SettlementOutcome::Completed => Self::Completed,
            SettlementOutcome::Failed => Self::Failed,
        }
    }
}

uuid_id!(
    /// Identifier of a stored payment.
    TransactionId
);

/// Stored payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub idempotency_key: IdempotencyKey,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub amount_cents: i64,
    pub fee_cents: i64,
    pub currency: Currency,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether `user` sent or received this payment.
    pub fn involves(&self, user: &UserId) -> bool {
        &self.sender_id == user || &self.recipient_id == user
    }
}

/// Validation failures for a payment request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentValidationError {
    #[error("cannot send a payment to yourself")]
    SelfPayment,
    #[error("amount must be between {min} and {max} minor units")]
    AmountOutOfRange { min: i64, max: i64 },
    #[error("unsupported currency '{0}'")]
    UnsupportedCurrency(String),
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
}

impl PaymentValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::SelfPayment => "recipientId",
            Self::AmountOutOfRange { .. } => "amountCents",
            Self::UnsupportedCurrency(_) => "currency",
            Self::DescriptionTooLong { .. } => "description",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfPayment => "self_payment",
            Self::AmountOutOfRange { .. } => "out_of_range",
            Self::UnsupportedCurrency(_) => "unsupported_currency",
            Self::DescriptionTooLong { .. } => "too_long",
        }
    }
}

/// Raw payment request as submitted by a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub idempotency_key: IdempotencyKey,
    pub recipient_id: UserId,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
}

/// A request that passed every check not requiring storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub idempotency_key: IdempotencyKey,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub amount_cents: i64,
    pub currency: Currency,
    pub description: Option<String>,
}

impl ValidatedPayment {
    /// Check `request` on behalf of `sender`.
    ///
    /// The description is sanitised before its length is checked; a
    /// description that is empty after sanitising is dropped.
    pub fn try_new(sender: &UserId, request: PaymentRequest) -> Result<Self, PaymentValidationError> {
        if &request.recipient_id == sender {
            return Err(PaymentValidationError::SelfPayment);
        }
        if !(AMOUNT_MIN_CENTS..=AMOUNT_MAX_CENTS).contains(&request.amount_cents) {
            return Err(PaymentValidationError::AmountOutOfRange {
                min: AMOUNT_MIN_CENTS,
                max: AMOUNT_MAX_CENTS,
            });
        }
        let currency = request.currency.parse::<Currency>()?;
        let description = request
            .description
            .as_deref()
            .map(sanitize_inline)
            .filter(|text| !text.is_empty());
        if description
            .as_ref()
            .is_some_and(|text| text.chars().count() > DESCRIPTION_MAX)
        {
            return Err(PaymentValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            idempotency_key: request.idempotency_key,
            sender_id: sender.clone(),
            recipient_id: request.recipient_id,
            amount_cents: request.amount_cents,
            currency,
            description,
        })
    }
}

/// Service fee charged per payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    flat_fee_cents: i64,
}

impl FeePolicy {
    pub fn flat(flat_fee_cents: i64) -> Self {
        Self {
            flat_fee_cents: flat_fee_cents.max(0),
        }
    }

    /// Fee owed for a transfer of `amount_cents`.
    pub fn fee_for(&self, _amount_cents: i64) -> i64 {
        self.flat_fee_cents
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::flat(DEFAULT_FLAT_FEE_CENTS)
    }
}

/// Result of a send: the stored payment and whether it was replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub transaction: Transaction,
    pub replayed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sender() -> UserId {
        UserId::random()
    }

    fn request(recipient: UserId, amount_cents: i64, currency: &str) -> PaymentRequest {
        PaymentRequest {
            idempotency_key: IdempotencyKey::random(),
            recipient_id: recipient,
            amount_cents,
            currency: currency.to_owned(),
            description: None,
        }
    }

    #[rstest]
    fn rejects_payment_to_self(sender: UserId) {
        let err = ValidatedPayment::try_new(&sender, request(sender.clone(), 500, "USD"))
            .expect_err("self payment");
        assert_eq!(err, PaymentValidationError::SelfPayment);
        assert_eq!(err.field(), "recipientId");
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    #[case(AMOUNT_MAX_CENTS + 1)]
    fn rejects_amounts_out_of_range(sender: UserId, #[case] amount: i64) {
        let err = ValidatedPayment::try_new(&sender, request(UserId::random(), amount, "USD"))
            .expect_err("bad amount");
        assert!(matches!(err, PaymentValidationError::AmountOutOfRange { .. }));
    }

    #[rstest]
    #[case(AMOUNT_MIN_CENTS)]
    #[case(AMOUNT_MAX_CENTS)]
    fn accepts_amount_bounds(sender: UserId, #[case] amount: i64) {
        let payment = ValidatedPayment::try_new(&sender, request(UserId::random(), amount, "GBP"))
            .expect("valid amount");
        assert_eq!(payment.amount_cents, amount);
        assert_eq!(payment.currency, Currency::Gbp);
    }

    #[rstest]
    #[case("usd")]
    #[case("JPY")]
    #[case("")]
    fn rejects_unknown_currency(sender: UserId, #[case] currency: &str) {
        let err = ValidatedPayment::try_new(&sender, request(UserId::random(), 10, currency))
            .expect_err("bad currency");
        assert_eq!(err.field(), "currency");
    }

    #[rstest]
    fn sanitises_description(sender: UserId) {
        let mut req = request(UserId::random(), 10, "EUR");
        req.description = Some("Lunch <script>alert('x')</script><b>thanks</b>".into());
        let payment = ValidatedPayment::try_new(&sender, req).expect("valid");
        assert_eq!(payment.description.as_deref(), Some("Lunch thanks"));
    }

    #[rstest]
    fn markup_only_description_is_dropped(sender: UserId) {
        let mut req = request(UserId::random(), 10, "EUR");
        req.description = Some("<script>x</script>".into());
        let payment = ValidatedPayment::try_new(&sender, req).expect("valid");
        assert!(payment.description.is_none());
    }

    #[rstest]
    fn rejects_overlong_description(sender: UserId) {
        let mut req = request(UserId::random(), 10, "EUR");
        req.description = Some("x".repeat(DESCRIPTION_MAX + 1));
        let err = ValidatedPayment::try_new(&sender, req).expect_err("too long");
        assert_eq!(
            err,
            PaymentValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX
            }
        );
    }

    #[rstest]
    fn flat_fee_ignores_amount() {
        let policy = FeePolicy::default();
        assert_eq!(policy.fee_for(1), DEFAULT_FLAT_FEE_CENTS);
        assert_eq!(policy.fee_for(AMOUNT_MAX_CENTS), DEFAULT_FLAT_FEE_CENTS);
        assert_eq!(FeePolicy::flat(-3).fee_for(10), 0);
    }

    #[rstest]
    fn status_serialises_upper_case() {
        assert_eq!(
            serde_json::to_value(TransactionStatus::Pending).expect("serialise"),
            "PENDING"
        );
        assert_eq!(
            "COMPLETED".parse::<TransactionStatus>(),
            Ok(TransactionStatus::Completed)
        );
    }
}
