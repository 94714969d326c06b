//! Payment-request engine tests against a real PostgreSQL database.
//!
//! Ignored by default; set `DATABASE_URL` to a disposable database and run
//! `cargo test -- --ignored` to execute them.

mod common;

use peerpay::models::payment_requests::{NewPaymentRequest, RequestState};
use peerpay::repositories::payment_requests::PaymentRequestRepository;
use peerpay::repositories::transfers::TransferRepository;
use peerpay::repositories::LedgerError;
use sqlx::PgPool;

fn payment_requests(pool: &PgPool) -> PaymentRequestRepository {
    let transfers = TransferRepository::new(pool.clone(), 1);
    PaymentRequestRepository::new(pool.clone(), transfers, 7)
}

fn new_request(requester: &str, payer: Option<&str>, amount: i64) -> NewPaymentRequest {
    NewPaymentRequest {
        requester_id: requester.to_string(),
        payer_id: payer.map(str::to_string),
        amount,
        message: None,
    }
}

async fn push_due_date_into_past(pool: &PgPool, request_id: &str) {
    sqlx::query("UPDATE payment_requests SET due_date = now() - interval '1 day' WHERE id = $1")
        .bind(request_id)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn open_request_is_paid_and_binds_payer() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 50).await;
    let payer = common::seed_user(&pool, "payer", 200).await;

    let request = repo
        .create(new_request(&requester.id, None, 150))
        .await
        .unwrap();
    assert_eq!(request.state, RequestState::Pending);
    assert_eq!(request.payer_id, None);

    let paid = repo.pay(&request.id, &payer.id).await.unwrap();

    assert_eq!(paid.state, RequestState::Paid);
    assert_eq!(paid.payer_id.as_deref(), Some(payer.id.as_str()));
    assert_eq!(common::balance_of(&pool, &payer.id).await, 50);
    assert_eq!(common::balance_of(&pool, &requester.id).await, 200);
    assert_eq!(common::transfer_count_from(&pool, &payer.id).await, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn request_is_paid_at_most_once() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;
    let payer = common::seed_user(&pool, "payer", 500).await;

    let request = repo
        .create(new_request(&requester.id, None, 100))
        .await
        .unwrap();

    repo.pay(&request.id, &payer.id).await.unwrap();
    let second = repo.pay(&request.id, &payer.id).await;

    assert!(matches!(second, Err(LedgerError::AlreadyPaid(_))));
    assert_eq!(common::balance_of(&pool, &payer.id).await, 400);
    assert_eq!(common::balance_of(&pool, &requester.id).await, 100);
    assert_eq!(common::transfer_count_from(&pool, &payer.id).await, 1);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn restricted_request_rejects_other_payers() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;
    let payer = common::seed_user(&pool, "payer", 500).await;
    let stranger = common::seed_user(&pool, "stranger", 500).await;

    let request = repo
        .create(new_request(&requester.id, Some(&payer.id), 100))
        .await
        .unwrap();

    let wrong = repo.pay(&request.id, &stranger.id).await;
    assert!(matches!(wrong, Err(LedgerError::WrongPayer { .. })));

    let paid = repo.pay(&request.id, &payer.id).await.unwrap();
    assert_eq!(paid.state, RequestState::Paid);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn failed_payment_leaves_no_half_applied_state() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 10).await;
    let payer = common::seed_user(&pool, "payer", 50).await;

    let request = repo
        .create(new_request(&requester.id, None, 150))
        .await
        .unwrap();

    let result = repo.pay(&request.id, &payer.id).await;
    assert!(matches!(
        result,
        Err(LedgerError::InsufficientBalance { .. })
    ));

    // The paid transition and the payer binding must have rolled back with
    // the failed transfer.
    let reloaded = repo.get(&request.id).await.unwrap();
    assert_eq!(reloaded.state, RequestState::Pending);
    assert_eq!(reloaded.payer_id, None);
    assert_eq!(common::balance_of(&pool, &payer.id).await, 50);
    assert_eq!(common::balance_of(&pool, &requester.id).await, 10);
    assert_eq!(common::transfer_count_from(&pool, &payer.id).await, 0);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn scan_marks_lapsed_pending_requests_overdue() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;

    let lapsed = repo
        .create(new_request(&requester.id, None, 100))
        .await
        .unwrap();
    let fresh = repo
        .create(new_request(&requester.id, None, 100))
        .await
        .unwrap();
    push_due_date_into_past(&pool, &lapsed.id).await;

    let listed = repo.get_by_requester_id(&requester.id).await.unwrap();
    let scanned = repo.scan_overdue(listed).await;

    let lapsed_after = scanned.iter().find(|r| r.id == lapsed.id).unwrap();
    let fresh_after = scanned.iter().find(|r| r.id == fresh.id).unwrap();
    assert_eq!(lapsed_after.state, RequestState::Overdue);
    assert_eq!(fresh_after.state, RequestState::Pending);

    // The transition is persisted, not only reflected in the output.
    assert_eq!(
        repo.get(&lapsed.id).await.unwrap().state,
        RequestState::Overdue
    );
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn overdue_request_can_still_be_paid() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;
    let payer = common::seed_user(&pool, "payer", 500).await;

    let request = repo
        .create(new_request(&requester.id, Some(&payer.id), 100))
        .await
        .unwrap();
    push_due_date_into_past(&pool, &request.id).await;

    let scanned = repo
        .scan_overdue(vec![repo.get(&request.id).await.unwrap()])
        .await;
    assert_eq!(scanned[0].state, RequestState::Overdue);

    let paid = repo.pay(&request.id, &payer.id).await.unwrap();
    assert_eq!(paid.state, RequestState::Paid);
    assert_eq!(common::balance_of(&pool, &requester.id).await, 100);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn rejected_request_cannot_be_paid() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;
    let payer = common::seed_user(&pool, "payer", 500).await;

    let request = repo
        .create(new_request(&requester.id, Some(&payer.id), 100))
        .await
        .unwrap();

    let rejected = repo.reject(&request.id).await.unwrap();
    assert_eq!(rejected.state, RequestState::Rejected);

    let result = repo.pay(&request.id, &payer.id).await;
    assert!(matches!(result, Err(LedgerError::RequestClosed { .. })));
    assert_eq!(common::balance_of(&pool, &payer.id).await, 500);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn create_with_invalid_amount_is_rejected() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;

    let result = repo.create(new_request(&requester.id, None, 0)).await;
    assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));

    let listed = repo.get_by_requester_id(&requester.id).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn point_lookup_is_idempotent() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;
    let request = repo
        .create(new_request(&requester.id, None, 100))
        .await
        .unwrap();

    let first = repo.get(&request.id).await.unwrap();
    let second = repo.get(&request.id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn delete_removes_the_request() {
    let pool = common::pool().await;
    let repo = payment_requests(&pool);

    let requester = common::seed_user(&pool, "requester", 0).await;
    let request = repo
        .create(new_request(&requester.id, None, 100))
        .await
        .unwrap();

    let deleted = repo.delete(&request.id).await.unwrap();
    assert_eq!(deleted.id, request.id);

    let lookup = repo.get(&request.id).await;
    assert!(matches!(lookup, Err(LedgerError::NotFound(_))));

    let again = repo.delete(&request.id).await;
    assert!(matches!(again, Err(LedgerError::NotFound(_))));
}
