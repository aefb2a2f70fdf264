// Smoke run of the query layer against DATABASE_URL, or an in-memory
// database when it is unset.
use std::str::FromStr;

use anyhow::{ensure, Context};
use dotenvy::dotenv;
use rust_decimal::Decimal;

use debt_tracker::achievements;
use debt_tracker::database::db::{connection, migrate, queries};
use debt_tracker::database::models::{NewDebt, NewPayment, PaymentStatus};
use debt_tracker::logging::{init_logging, LogFormat};
use debt_tracker::repayment::{self, PlanDebt, Strategy};
use debt_tracker::util::{now, today};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging("db_test=info,debt_tracker=info", LogFormat::Pretty)?;

    let pool = match std::env::var("DATABASE_URL") {
        Ok(url) => connection::get_db_pool(&url, 1).await?,
        Err(_) => connection::memory_pool().await?,
    };
    migrate::run_migrations(&pool).await?;
    println!("Migrations ran successfully!");

    // ----------------------------------------------------
    // TEST：CREATE USER
    // ----------------------------------------------------
    println!("\n--- Testing: create_user ---");
    let email = format!("smoke-{}@example.com", now().and_utc().timestamp_micros());
    let user = queries::create_user(&pool, Some("Smoke Test"), &email, "not-a-real-hash").await?;
    println!("   > User created successfully {}", user.user_id);
    ensure!(user.level == 1, "new users start at level 1");

    let fetched = queries::get_user_by_email(&pool, &email)
        .await?
        .context("user not found by email")?;
    ensure!(fetched.user_id == user.user_id, "user id not matched");

    // ----------------------------------------------------
    // TEST：PEOPLE AND DEBTS
    // ----------------------------------------------------
    println!("\n--- Testing: create_person / create_debt ---");
    let person = queries::create_person(&pool, user.user_id, "Landlord", Some("555-0100")).await?;
    let debt = queries::create_debt(
        &pool,
        user.user_id,
        &NewDebt {
            person_id: Some(person.id),
            name: Some("Rent arrears".into()),
            debt_type: Some("Personal".into()),
            principal: Decimal::from_str("100.00")?,
            currency: "CAD".into(),
            description: None,
            interest_rate: Decimal::from_str("5.00")?,
            minimum_payment: Decimal::from_str("25.00")?,
            due_date: Some(today()),
        },
    )
    .await?;
    println!("   > Debt created successfully, ID: {}", debt.debt_id);

    let upcoming = queries::list_upcoming_debts(&pool, user.user_id, today(), today()).await?;
    println!("   > Debts due today: {}", upcoming.len());
    ensure!(upcoming.len() == 1, "debt due today is missing from upcoming");

    // ----------------------------------------------------
    // TEST：PLAN
    // ----------------------------------------------------
    println!("\n--- Testing: simulate / create_plan ---");
    let plan_debts = vec![PlanDebt {
        debt_id: debt.debt_id,
        name: debt.name.clone(),
        outstanding: debt.principal,
        interest_rate: debt.interest_rate,
        minimum_payment: debt.minimum_payment,
    }];
    let schedule = repayment::simulate(Strategy::Avalanche, &plan_debts, None)?;
    let plan = queries::create_plan(
        &pool,
        user.user_id,
        Some("Smoke plan"),
        Strategy::Avalanche,
        schedule.monthly_budget,
        i64::from(schedule.months),
        schedule.total_interest,
        schedule.payoff_date(today()),
    )
    .await?;
    println!("   > Plan {} pays off in {} months", plan.plan_id, schedule.months);

    // ----------------------------------------------------
    // TEST：PAYMENTS AND SETTLEMENT
    // ----------------------------------------------------
    println!("\n--- Testing: record_payment ---");
    for (amount, plan_id) in [("40.00", Some(plan.plan_id)), ("60.00", None)] {
        let (payment, bal) = queries::record_payment(
            &pool,
            user.user_id,
            debt.debt_id,
            &NewPayment {
                plan_id,
                amount: Decimal::from_str(amount)?,
                payment_date: now(),
                status: PaymentStatus::Paid,
                note: None,
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("record_payment failed: {e}"))?;
        println!(
            "   > Payment {} of {}: outstanding {}, settled {}",
            payment.payment_id, payment.amount, bal.outstanding, bal.settled
        );
    }

    let settled = queries::get_debt(&pool, user.user_id, debt.debt_id)
        .await?
        .context("debt disappeared")?;
    ensure!(settled.is_settled, "debt should be settled after paying it in full");

    let rejected = queries::record_payment(
        &pool,
        user.user_id,
        debt.debt_id,
        &NewPayment {
            plan_id: None,
            amount: Decimal::ONE,
            payment_date: now(),
            status: PaymentStatus::Paid,
            note: None,
        },
    )
    .await;
    ensure!(rejected.is_err(), "payment on a settled debt was accepted");
    println!("   > Payment on settled debt rejected");

    // ----------------------------------------------------
    // TEST：BADGES
    // ----------------------------------------------------
    println!("\n--- Testing: award_badges ---");
    let debts = queries::list_debts(&pool, user.user_id).await?;
    let payments = queries::list_payments_for_user(&pool, user.user_id).await?;
    let earned = achievements::earned(&achievements::stats(&debts, &payments));
    let awarded = queries::award_badges(&pool, user.user_id, &earned).await?;
    println!("   > Awarded: {:?}", awarded);

    let again = queries::award_badges(&pool, user.user_id, &earned).await?;
    ensure!(again.is_empty(), "badges were awarded twice");

    let badges = queries::list_user_badges(&pool, user.user_id).await?;
    let level = queries::get_user_by_id(&pool, user.user_id)
        .await?
        .context("user disappeared")?
        .level;
    println!("   > {} badges, level {}", badges.len(), level);
    ensure!(level == 1 + badges.len() as i64, "level does not track badge count");

    // ----------------------------------------------------
    // CLEANUP
    // ----------------------------------------------------
    println!("\n--- Testing: delete_user ---");
    ensure!(queries::delete_user(&pool, user.user_id).await?, "delete_user failed");
    ensure!(
        queries::list_payments_for_user(&pool, user.user_id).await?.is_empty(),
        "payments survived the user"
    );

    println!("\nAll query smoke checks passed.");
    Ok(())
}
