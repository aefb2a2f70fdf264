use std::path::PathBuf;

use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use debt_tracker::database::db::{connection, migrate, queries};
use debt_tracker::database::models::{Debt, NewDebt, NewPayment, PaymentStatus};
use debt_tracker::error::ApiError;
use debt_tracker::util::now;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn seed_debt(pool: &Pool<Sqlite>, email: &str, principal: &str) -> Debt {
    let user = queries::create_user(pool, None, email, "hash").await.unwrap();
    queries::create_debt(
        pool,
        user.user_id,
        &NewDebt {
            person_id: None,
            name: Some("Loan".into()),
            debt_type: None,
            principal: dec(principal),
            currency: "USD".into(),
            description: None,
            interest_rate: Decimal::ZERO,
            minimum_payment: Decimal::ZERO,
            due_date: None,
        },
    )
    .await
    .unwrap()
}

fn payment(amount: &str) -> NewPayment {
    NewPayment {
        plan_id: None,
        amount: dec(amount),
        payment_date: now(),
        status: PaymentStatus::Paid,
        note: None,
    }
}

#[tokio::test]
async fn stale_debt_update_keeps_settlement() {
    let pool = connection::memory_pool().await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    let debt = seed_debt(&pool, "stale@example.com", "100.00").await;

    // an edit reads the debt while it is still open
    let mut stale = queries::get_debt(&pool, debt.user_id, debt.debt_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stale.is_settled);

    // a payment settles it before the edit is written
    let (_, bal) = queries::record_payment(&pool, debt.user_id, debt.debt_id, &payment("100.00"))
        .await
        .unwrap();
    assert!(bal.settled);

    stale.name = Some("Renamed".into());
    let written = queries::update_debt(&pool, &stale).await.unwrap();
    assert_eq!(written.name.as_deref(), Some("Renamed"));
    assert!(written.is_settled);

    let reread = queries::get_debt(&pool, debt.user_id, debt.debt_id)
        .await
        .unwrap()
        .unwrap();
    assert!(reread.is_settled);
}

fn scratch_db() -> PathBuf {
    let nanos = now().and_utc().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!("debt-tracker-{}-{nanos}.db", std::process::id()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_payments_cannot_both_fit_the_balance() {
    let path = scratch_db();
    let pool = connection::get_db_pool(&format!("sqlite://{}", path.display()), 4)
        .await
        .unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    let debt = seed_debt(&pool, "race@example.com", "100.00").await;

    let first = payment("60.00");
    let second = payment("60.00");
    let (a, b) = tokio::join!(
        queries::record_payment(&pool, debt.user_id, debt.debt_id, &first),
        queries::record_payment(&pool, debt.user_id, debt.debt_id, &second),
    );

    let results = [a, b];
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(ApiError::Validation(_))))
        .count();
    assert_eq!((accepted, rejected), (1, 1), "{results:?}");

    let payments = queries::list_payments_for_debt(&pool, debt.debt_id).await.unwrap();
    assert_eq!(payments.len(), 1);

    pool.close().await;
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
