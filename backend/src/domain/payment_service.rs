//! Payment domain service.
//!
//! Sends are deduplicated by the client's idempotency key. A key already used
//! by the same sender replays the stored transaction; the same key from a
//! different sender is a conflict. Concurrent sends racing on one key are
//! resolved by the unique index: the loser re-reads the winner and replays it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    PaymentCommand, PaymentQuery, TransactionRepository, TransactionRepositoryError,
    UserRepository,
};
use crate::domain::{
    Caller, Error, FeePolicy, IdempotencyKey, Page, PageRequest, PaymentOutcome, PaymentRequest,
    Permission, SettlementOutcome, Transaction, TransactionId, TransactionStatus,
    ValidatedPayment,
};

/// Payment service implementing the payment driving ports.
#[derive(Clone)]
pub struct PaymentService<T, U> {
    transactions: Arc<T>,
    users: Arc<U>,
    fees: FeePolicy,
    clock: Arc<dyn Clock>,
}

impl<T, U> PaymentService<T, U> {
    pub fn new(transactions: Arc<T>, users: Arc<U>, fees: FeePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions,
            users,
            fees,
            clock,
        }
    }
}

impl<T, U> PaymentService<T, U>
where
    T: TransactionRepository,
    U: UserRepository,
{
    fn map_transaction_error(error: TransactionRepositoryError) -> Error {
        match error {
            TransactionRepositoryError::Connection { message } => Error::service_unavailable(
                format!("transaction repository unavailable: {message}"),
            ),
            TransactionRepositoryError::Query { message } => {
                Error::internal(format!("transaction repository error: {message}"))
            }
            TransactionRepositoryError::DuplicateKey { message } => {
                Error::internal(format!("unexpected idempotency key conflict: {message}"))
            }
        }
    }

    fn replay_for(sender: &Caller, existing: Transaction) -> Result<PaymentOutcome, Error> {
        if &existing.sender_id != sender.user_id() {
            return Err(Error::conflict("idempotency key already used")
                .with_details(serde_json::json!({ "code": "idempotency_key_reused" })));
        }
        tracing::debug!(transaction_id = %existing.id, "replaying payment");
        Ok(PaymentOutcome {
            transaction: existing,
            replayed: true,
        })
    }

    async fn find_existing(&self, key: &IdempotencyKey) -> Result<Option<Transaction>, Error> {
        self.transactions
            .find_by_idempotency_key(key)
            .await
            .map_err(Self::map_transaction_error)
    }

    fn build_transaction(&self, payment: ValidatedPayment) -> Transaction {
        let now = self.clock.utc();
        Transaction {
            id: TransactionId::random(),
            fee_cents: self.fees.fee_for(payment.amount_cents),
            idempotency_key: payment.idempotency_key,
            sender_id: payment.sender_id,
            recipient_id: payment.recipient_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            description: payment.description,
            status: TransactionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl<T, U> PaymentCommand for PaymentService<T, U>
where
    T: TransactionRepository,
    U: UserRepository,
{
    async fn send(
        &self,
        caller: &Caller,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, Error> {
        caller.require(Permission::Write)?;
        if let Some(existing) = self.find_existing(&request.idempotency_key).await? {
            return Self::replay_for(caller, existing);
        }

        let payment = ValidatedPayment::try_new(caller.user_id(), request)
            .map_err(|err| Error::invalid_field(err.field(), err.code(), err.to_string()))?;
        let recipient = self
            .users
            .find_by_id(&payment.recipient_id)
            .await
            .map_err(map_user_error)?;
        if recipient.is_none() {
            return Err(Error::not_found("recipient not found"));
        }

        let transaction = self.build_transaction(payment);
        match self.transactions.insert(&transaction).await {
            Ok(()) => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    amount_cents = transaction.amount_cents,
                    currency = %transaction.currency,
                    "payment recorded"
                );
                Ok(PaymentOutcome {
                    transaction,
                    replayed: false,
                })
            }
            Err(TransactionRepositoryError::DuplicateKey { .. }) => {
                match self.find_existing(&transaction.idempotency_key).await? {
                    Some(winner) => Self::replay_for(caller, winner),
                    None => Err(Error::internal(
                        "idempotency key conflict without a stored transaction",
                    )),
                }
            }
            Err(err) => Err(Self::map_transaction_error(err)),
        }
    }

    async fn settle(
        &self,
        caller: &Caller,
        id: &TransactionId,
        outcome: SettlementOutcome,
    ) -> Result<Transaction, Error> {
        caller.require_admin()?;
        let target = TransactionStatus::from(outcome);
        if let Some(settled) = self
            .transactions
            .transition_status(id, TransactionStatus::Pending, target, self.clock.utc())
            .await
            .map_err(Self::map_transaction_error)?
        {
            tracing::info!(transaction_id = %id, status = target.as_str(), "payment settled");
            return Ok(settled);
        }

        match self
            .transactions
            .find_by_id(id)
            .await
            .map_err(Self::map_transaction_error)?
        {
            Some(current) => Err(Error::conflict(format!(
                "payment is {} and can no longer be settled",
                current.status.as_str()
            ))),
            None => Err(Error::not_found("payment not found")),
        }
    }
}

#[async_trait]
impl<T, U> PaymentQuery for PaymentService<T, U>
where
    T: TransactionRepository,
    U: UserRepository,
{
    async fn list(&self, caller: &Caller, page: PageRequest) -> Result<Page<Transaction>, Error> {
        caller.require(Permission::Read)?;
        self.transactions
            .list_for_user(caller.user_id(), page)
            .await
            .map_err(Self::map_transaction_error)
    }

    async fn get(&self, caller: &Caller, id: &TransactionId) -> Result<Transaction, Error> {
        caller.require(Permission::Read)?;
        let transaction = self
            .transactions
            .find_by_id(id)
            .await
            .map_err(Self::map_transaction_error)?
            .ok_or_else(|| Error::not_found("payment not found"))?;
        if transaction.involves(caller.user_id()) || caller.is_admin() {
            Ok(transaction)
        } else {
            Err(Error::forbidden("not a participant in this payment"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockTransactionRepository, MockUserRepository, UserPersistenceError,
    };
    use crate::domain::{ApiKeyId, ApiKeyPrincipal, Currency, ErrorCode, Role, UserId};
    use crate::test_support::{fixture_clock, fixture_timestamp, session_caller, user_with};
    use rstest::{fixture, rstest};

    type Service = PaymentService<MockTransactionRepository, MockUserRepository>;

    fn service(transactions: MockTransactionRepository, users: MockUserRepository) -> Service {
        PaymentService::new(
            Arc::new(transactions),
            Arc::new(users),
            FeePolicy::default(),
            fixture_clock(),
        )
    }

    #[fixture]
    fn sender() -> Caller {
        session_caller(Role::Founder)
    }

    fn request(recipient: &UserId, key: &str) -> PaymentRequest {
        PaymentRequest {
            idempotency_key: IdempotencyKey::new(key).expect("valid key"),
            recipient_id: recipient.clone(),
            amount_cents: 2_500,
            currency: "USD".to_owned(),
            description: Some("Design <script>alert(1)</script>work".to_owned()),
        }
    }

    fn stored(sender: &UserId, recipient: &UserId, key: &str) -> Transaction {
        Transaction {
            id: TransactionId::random(),
            idempotency_key: IdempotencyKey::new(key).expect("valid key"),
            sender_id: sender.clone(),
            recipient_id: recipient.clone(),
            amount_cents: 2_500,
            fee_cents: 100,
            currency: Currency::Usd,
            description: None,
            status: TransactionStatus::Pending,
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        }
    }

    fn recipient_exists(users: &mut MockUserRepository, recipient: &UserId) {
        let user = user_with(recipient, "bob@example.com", Role::Developer);
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(user)));
    }

    #[rstest]
    #[tokio::test]
    async fn send_records_pending_payment_with_fee(sender: Caller) {
        let recipient = UserId::random();
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_idempotency_key()
            .return_once(|_| Ok(None));
        transactions
            .expect_insert()
            .withf(|tx| {
                tx.status == TransactionStatus::Pending
                    && tx.fee_cents == 100
                    && tx.description.as_deref() == Some("Design work")
            })
            .times(1)
            .return_once(|_| Ok(()));
        let mut users = MockUserRepository::new();
        recipient_exists(&mut users, &recipient);

        let outcome = service(transactions, users)
            .send(&sender, request(&recipient, "key-1"))
            .await
            .expect("sent");
        assert!(!outcome.replayed);
        assert_eq!(outcome.transaction.sender_id, *sender.user_id());
        assert_eq!(outcome.transaction.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_key_replays_without_insert(sender: Caller) {
        let recipient = UserId::random();
        let existing = stored(sender.user_id(), &recipient, "key-1");
        let expected = existing.clone();
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_idempotency_key()
            .return_once(move |_| Ok(Some(existing)));
        transactions.expect_insert().times(0);
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);

        let outcome = service(transactions, users)
            .send(&sender, request(&recipient, "key-1"))
            .await
            .expect("replayed");
        assert!(outcome.replayed);
        assert_eq!(outcome.transaction, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn key_reused_by_another_sender_conflicts(sender: Caller) {
        let recipient = UserId::random();
        let existing = stored(&UserId::random(), &recipient, "key-1");
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_idempotency_key()
            .return_once(move |_| Ok(Some(existing)));

        let err = service(transactions, MockUserRepository::new())
            .send(&sender, request(&recipient, "key-1"))
            .await
            .expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn insert_race_replays_the_winner(sender: Caller) {
        let recipient = UserId::random();
        let winner = stored(sender.user_id(), &recipient, "key-1");
        let winner_id = winner.id;
        let mut transactions = MockTransactionRepository::new();
        let mut lookups = mockall::Sequence::new();
        transactions
            .expect_find_by_idempotency_key()
            .times(1)
            .in_sequence(&mut lookups)
            .return_once(|_| Ok(None));
        transactions
            .expect_insert()
            .return_once(|_| Err(TransactionRepositoryError::duplicate_key("key-1")));
        transactions
            .expect_find_by_idempotency_key()
            .times(1)
            .in_sequence(&mut lookups)
            .return_once(move |_| Ok(Some(winner)));
        let mut users = MockUserRepository::new();
        recipient_exists(&mut users, &recipient);

        let outcome = service(transactions, users)
            .send(&sender, request(&recipient, "key-1"))
            .await
            .expect("replayed");
        assert!(outcome.replayed);
        assert_eq!(outcome.transaction.id, winner_id);
    }

    #[rstest]
    #[tokio::test]
    async fn paying_yourself_is_rejected(sender: Caller) {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_idempotency_key()
            .return_once(|_| Ok(None));
        transactions.expect_insert().times(0);

        let err = service(transactions, MockUserRepository::new())
            .send(&sender, request(sender.user_id(), "key-2"))
            .await
            .expect_err("self payment");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some("recipientId")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_recipient_is_not_found(sender: Caller) {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_idempotency_key()
            .return_once(|_| Ok(None));
        transactions.expect_insert().times(0);
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));

        let err = service(transactions, users)
            .send(&sender, request(&UserId::random(), "key-3"))
            .await
            .expect_err("missing recipient");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn user_lookup_outage_is_unavailable(sender: Caller) {
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_idempotency_key()
            .return_once(|_| Ok(None));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|_| Err(UserPersistenceError::connection("refused")));

        let err = service(transactions, users)
            .send(&sender, request(&UserId::random(), "key-4"))
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn read_only_keys_cannot_send() {
        let caller = Caller::from_api_key(ApiKeyPrincipal {
            key_id: ApiKeyId::random(),
            owner_id: UserId::random(),
            owner_role: Role::Developer,
            permission: Permission::Read,
        });
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_find_by_idempotency_key().times(0);

        let err = service(transactions, MockUserRepository::new())
            .send(&caller, request(&UserId::random(), "key-5"))
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn settle_requires_admin(sender: Caller) {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_transition_status().times(0);
        let err = service(transactions, MockUserRepository::new())
            .settle(&sender, &TransactionId::random(), SettlementOutcome::Completed)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn settling_a_finished_payment_conflicts() {
        let admin = session_caller(Role::Admin);
        let mut finished = stored(&UserId::random(), &UserId::random(), "key-6");
        finished.status = TransactionStatus::Completed;
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_transition_status()
            .withf(|_, from, to, _| {
                *from == TransactionStatus::Pending && *to == TransactionStatus::Failed
            })
            .return_once(|_, _, _, _| Ok(None));
        transactions
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(finished)));

        let err = service(transactions, MockUserRepository::new())
            .settle(&admin, &TransactionId::random(), SettlementOutcome::Failed)
            .await
            .expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case::participant(true, Role::Developer, true)]
    #[case::admin(false, Role::Admin, true)]
    #[case::stranger(false, Role::Investor, false)]
    #[tokio::test]
    async fn get_is_limited_to_participants_and_admins(
        #[case] is_sender: bool,
        #[case] role: Role,
        #[case] allowed: bool,
    ) {
        let caller = session_caller(role);
        let sender_id = if is_sender {
            caller.user_id().clone()
        } else {
            UserId::random()
        };
        let transaction = stored(&sender_id, &UserId::random(), "key-7");
        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(transaction)));

        let result = service(transactions, MockUserRepository::new())
            .get(&caller, &TransactionId::random())
            .await;
        match result {
            Ok(_) => assert!(allowed),
            Err(err) => {
                assert!(!allowed);
                assert_eq!(err.code(), ErrorCode::Forbidden);
            }
        }
    }
}
