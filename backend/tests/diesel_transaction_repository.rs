//! `DieselTransactionRepository` and the payment service against embedded
//! PostgreSQL.
//!
//! The unique index on `transactions.idempotency_key` is what settles racing
//! sends; these tests exercise it directly and through `PaymentService`.

use std::sync::Arc;

use chrono::{DurationRound as _, TimeDelta, Utc};
use dfds_backend::domain::ports::{
    PaymentCommand as _, PaymentQuery as _, TransactionRepository as _,
    TransactionRepositoryError,
};
use dfds_backend::domain::{
    Caller, Currency, ErrorCode, FeePolicy, IdempotencyKey, PageRequest, PaymentRequest,
    PaymentService, Role, Transaction, TransactionId, TransactionStatus,
};
use dfds_backend::outbound::persistence::{DieselTransactionRepository, DieselUserRepository};
use mockable::{Clock, DefaultClock};
use rstest::rstest;

#[expect(
    dead_code,
    reason = "Shared harness has fields and helpers used by other integration suites."
)]
mod support;

use support::seed::seed_user;
use support::{TestDatabase, test_database};

type Payments = PaymentService<DieselTransactionRepository, DieselUserRepository>;

fn payment_service(db: &TestDatabase) -> Payments {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    PaymentService::new(
        Arc::new(DieselTransactionRepository::new(db.pool.clone())),
        Arc::new(DieselUserRepository::new(db.pool.clone())),
        FeePolicy::flat(100),
        clock,
    )
}

fn request(key: &IdempotencyKey, recipient: &Caller, amount_cents: i64) -> PaymentRequest {
    PaymentRequest {
        idempotency_key: key.clone(),
        recipient_id: recipient.user_id().clone(),
        amount_cents,
        currency: "USD".to_owned(),
        description: Some("seed round <b>deposit</b>".to_owned()),
    }
}

fn transaction(key: &IdempotencyKey, sender: &Caller, recipient: &Caller) -> Transaction {
    // Postgres keeps microseconds; truncate so round-tripped rows compare equal.
    let now = Utc::now()
        .duration_trunc(TimeDelta::microseconds(1))
        .expect("truncate timestamp");
    Transaction {
        id: TransactionId::random(),
        idempotency_key: key.clone(),
        sender_id: sender.user_id().clone(),
        recipient_id: recipient.user_id().clone(),
        amount_cents: 2_500,
        fee_cents: 100,
        currency: Currency::Eur,
        description: None,
        status: TransactionStatus::Pending,
        created_at: now,
        updated_at: now,
    }
}

fn page() -> PageRequest {
    PageRequest::new(None, None).expect("default page")
}

#[rstest]
fn second_insert_with_the_same_key_hits_the_unique_index() {
    let Some(db) = test_database() else {
        return;
    };
    let sender = seed_user(&db, "Sender One", Role::Founder);
    let recipient = seed_user(&db, "Recipient One", Role::Developer);
    let repository = DieselTransactionRepository::new(db.pool.clone());
    let key = IdempotencyKey::random();

    let first = transaction(&key, &sender, &recipient);
    db.block_on(repository.insert(&first)).expect("first insert");
    let second = transaction(&key, &sender, &recipient);
    let err = db
        .block_on(repository.insert(&second))
        .expect_err("duplicate key must be rejected");
    assert!(
        matches!(err, TransactionRepositoryError::DuplicateKey { .. }),
        "unexpected error: {err:?}"
    );

    let stored = db
        .block_on(repository.find_by_idempotency_key(&key))
        .expect("lookup")
        .expect("stored row");
    assert_eq!(stored, first);
    let listed = db
        .block_on(repository.list_for_user(sender.user_id(), page()))
        .expect("list");
    assert_eq!(listed.total, 1);
}

#[rstest]
fn repeated_send_replays_the_stored_payment() {
    let Some(db) = test_database() else {
        return;
    };
    let sender = seed_user(&db, "Sender Two", Role::Investor);
    let recipient = seed_user(&db, "Recipient Two", Role::Founder);
    let service = payment_service(&db);
    let key = IdempotencyKey::random();

    let first = db
        .block_on(service.send(&sender, request(&key, &recipient, 5_000)))
        .expect("first send");
    let second = db
        .block_on(service.send(&sender, request(&key, &recipient, 9_999)))
        .expect("replayed send");

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(second.transaction.id, first.transaction.id);
    assert_eq!(second.transaction.amount_cents, 5_000);
    assert_eq!(
        second.transaction.description.as_deref(),
        Some("seed round deposit")
    );
    let listed = db
        .block_on(service.list(&sender, page()))
        .expect("list payments");
    assert_eq!(listed.total, 1);
}

#[rstest]
fn concurrent_sends_with_one_key_store_a_single_payment() {
    let Some(db) = test_database() else {
        return;
    };
    let sender = seed_user(&db, "Racing Sender", Role::Founder);
    let recipient = seed_user(&db, "Racing Recipient", Role::Developer);
    let service = Arc::new(payment_service(&db));
    let key = IdempotencyKey::random();

    let outcomes = db.block_on(async {
        let sends = (0..4).map(|_| {
            let service = Arc::clone(&service);
            let sender = sender.clone();
            let body = request(&key, &recipient, 1_200);
            tokio::spawn(async move { service.send(&sender, body).await })
        });
        futures_util::future::join_all(sends).await
    });

    let outcomes: Vec<_> = outcomes
        .into_iter()
        .map(|joined| joined.expect("task joins").expect("send succeeds"))
        .collect();
    let fresh = outcomes.iter().filter(|outcome| !outcome.replayed).count();
    assert_eq!(fresh, 1, "exactly one send stores the payment");
    let id = outcomes.first().expect("outcomes").transaction.id;
    assert!(outcomes.iter().all(|outcome| outcome.transaction.id == id));
    let listed = db
        .block_on(service.list(&sender, page()))
        .expect("list payments");
    assert_eq!(listed.total, 1);
}

#[rstest]
fn key_reused_by_another_sender_conflicts() {
    let Some(db) = test_database() else {
        return;
    };
    let sender = seed_user(&db, "First Sender", Role::Founder);
    let other = seed_user(&db, "Second Sender", Role::Founder);
    let recipient = seed_user(&db, "Shared Recipient", Role::Investor);
    let service = payment_service(&db);
    let key = IdempotencyKey::random();

    db.block_on(service.send(&sender, request(&key, &recipient, 700)))
        .expect("first send");
    let err = db
        .block_on(service.send(&other, request(&key, &recipient, 700)))
        .expect_err("foreign key reuse");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
fn status_transition_only_applies_from_the_expected_state() {
    let Some(db) = test_database() else {
        return;
    };
    let sender = seed_user(&db, "Settle Sender", Role::Founder);
    let recipient = seed_user(&db, "Settle Recipient", Role::Founder);
    let repository = DieselTransactionRepository::new(db.pool.clone());
    let stored = transaction(&IdempotencyKey::random(), &sender, &recipient);
    db.block_on(repository.insert(&stored)).expect("insert");

    let settled = db
        .block_on(repository.transition_status(
            &stored.id,
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            Utc::now(),
        ))
        .expect("transition")
        .expect("pending row moves");
    assert_eq!(settled.status, TransactionStatus::Completed);

    let again = db
        .block_on(repository.transition_status(
            &stored.id,
            TransactionStatus::Pending,
            TransactionStatus::Failed,
            Utc::now(),
        ))
        .expect("transition");
    assert!(again.is_none());
}
