use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::achievements::BadgeCode;
use crate::balance::{self, Balance};
use crate::database::models::{
    Badge, Debt, NewDebt, NewPayment, Payment, PaymentStatus, Person, RepaymentPlan, User,
    UserBadge,
};
use crate::error::{ApiError, ApiResult};
use crate::repayment::Strategy;
use crate::util::{fmt_money, now, parse_money};

/*
SQL for every table. Money columns are TEXT and are parsed back into Decimal
here, so nothing above this layer sees the storage representation.
Every lookup of a user-owned row filters on user_id as well as the id.
 */

const DEBT_COLUMNS: &str = r#"
    debt_id, user_id, person_id, name, debt_type, principal, currency,
    description, interest_rate, minimum_payment, due_date, is_settled,
    created_at, updated_at
"#;

const PAYMENT_COLUMNS: &str = r#"
    payment_id, debt_id, plan_id, amount, payment_date, status, note, created_at
"#;

const PLAN_COLUMNS: &str = r#"
    plan_id, user_id, name, strategy, monthly_budget, projected_months,
    projected_interest, projected_payoff_date, created_at
"#;

fn decode_err(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}

fn money(row: &SqliteRow, col: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(col)?;
    parse_money(&text).ok_or_else(|| decode_err(format!("Invalid Decimal format for {col}: {text}")))
}

fn debt_from_row(row: &SqliteRow) -> Result<Debt, sqlx::Error> {
    Ok(Debt {
        debt_id: row.try_get("debt_id")?,
        user_id: row.try_get("user_id")?,
        person_id: row.try_get("person_id")?,
        name: row.try_get("name")?,
        debt_type: row.try_get("debt_type")?,
        principal: money(row, "principal")?,
        currency: row.try_get("currency")?,
        description: row.try_get("description")?,
        interest_rate: money(row, "interest_rate")?,
        minimum_payment: money(row, "minimum_payment")?,
        due_date: row.try_get("due_date")?,
        is_settled: row.try_get("is_settled")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn payment_from_row(row: &SqliteRow) -> Result<Payment, sqlx::Error> {
    let status: String = row.try_get("status")?;
    Ok(Payment {
        payment_id: row.try_get("payment_id")?,
        debt_id: row.try_get("debt_id")?,
        plan_id: row.try_get("plan_id")?,
        amount: money(row, "amount")?,
        payment_date: row.try_get("payment_date")?,
        status: PaymentStatus::from_str(&status).map_err(decode_err)?,
        note: row.try_get("note")?,
        created_at: row.try_get("created_at")?,
    })
}

fn plan_from_row(row: &SqliteRow) -> Result<RepaymentPlan, sqlx::Error> {
    let strategy: String = row.try_get("strategy")?;
    Ok(RepaymentPlan {
        plan_id: row.try_get("plan_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        strategy: Strategy::from_str(&strategy).map_err(decode_err)?,
        monthly_budget: money(row, "monthly_budget")?,
        projected_months: row.try_get("projected_months")?,
        projected_interest: money(row, "projected_interest")?,
        projected_payoff_date: row.try_get("projected_payoff_date")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

/*==========User Queries=========== */

pub async fn get_user_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_id(pool: &Pool<Sqlite>, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

// Create user; the caller hashes the password and normalizes the email
pub async fn create_user(
    pool: &Pool<Sqlite>,
    name: Option<&str>,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, is_active, level, created_at)
        VALUES (?, ?, ?, 1, 1, ?)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(now())
    .fetch_one(pool)
    .await
}

// Delete user; people, debts, payments, plans and badges go with it
pub async fn delete_user(pool: &Pool<Sqlite>, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Person Queries=========== */

pub async fn create_person(
    pool: &Pool<Sqlite>,
    user_id: i64,
    name: &str,
    contact: Option<&str>,
) -> Result<Person, sqlx::Error> {
    sqlx::query_as::<_, Person>(
        r#"
        INSERT INTO people (user_id, name, contact)
        VALUES (?, ?, ?)
        RETURNING person_id, user_id, name, contact
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(contact)
    .fetch_one(pool)
    .await
}

pub async fn list_people(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Person>, sqlx::Error> {
    sqlx::query_as::<_, Person>(
        "SELECT person_id, user_id, name, contact FROM people WHERE user_id = ? ORDER BY name ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_person(
    pool: &Pool<Sqlite>,
    user_id: i64,
    person_id: i64,
) -> Result<Option<Person>, sqlx::Error> {
    sqlx::query_as::<_, Person>(
        "SELECT person_id, user_id, name, contact FROM people WHERE person_id = ? AND user_id = ?",
    )
    .bind(person_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/*==========Debt Queries=========== */

pub async fn create_debt(pool: &Pool<Sqlite>, user_id: i64, debt: &NewDebt) -> Result<Debt, sqlx::Error> {
    let at = now();
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO debts (
            user_id, person_id, name, debt_type, principal, currency, description,
            interest_rate, minimum_payment, due_date, is_settled, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        RETURNING {DEBT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(debt.person_id)
    .bind(&debt.name)
    .bind(&debt.debt_type)
    .bind(fmt_money(&debt.principal))
    .bind(&debt.currency)
    .bind(&debt.description)
    .bind(fmt_money(&debt.interest_rate))
    .bind(fmt_money(&debt.minimum_payment))
    .bind(debt.due_date)
    .bind(at)
    .bind(at)
    .fetch_one(pool)
    .await?;

    debt_from_row(&row)
}

// Get debt by id, only if it belongs to user_id
pub async fn get_debt(pool: &Pool<Sqlite>, user_id: i64, debt_id: i64) -> Result<Option<Debt>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {DEBT_COLUMNS} FROM debts WHERE debt_id = ? AND user_id = ?"
    ))
    .bind(debt_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .as_ref()
    .map(debt_from_row)
    .transpose()
}

// Newest first
pub async fn list_debts(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Debt>, sqlx::Error> {
    sqlx::query(&format!(
        r#"
        SELECT {DEBT_COLUMNS}
        FROM debts
        WHERE user_id = ?
        ORDER BY created_at DESC, debt_id DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(debt_from_row)
    .collect()
}

// Unsettled debts due between `from` and `to`, soonest first
pub async fn list_upcoming_debts(
    pool: &Pool<Sqlite>,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Debt>, sqlx::Error> {
    sqlx::query(&format!(
        r#"
        SELECT {DEBT_COLUMNS}
        FROM debts
        WHERE user_id = ?
          AND is_settled = 0
          AND due_date IS NOT NULL
          AND due_date >= ?
          AND due_date <= ?
        ORDER BY due_date ASC, debt_id ASC
        "#
    ))
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?
    .iter()
    .map(debt_from_row)
    .collect()
}

// Write back every editable field; ownership columns are never touched.
// is_settled only ever goes up, so a stale copy cannot undo a settlement
// committed after it was read.
pub async fn update_debt(pool: &Pool<Sqlite>, debt: &Debt) -> Result<Debt, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE debts
        SET person_id = ?, name = ?, debt_type = ?, principal = ?, currency = ?,
            description = ?, interest_rate = ?, minimum_payment = ?, due_date = ?,
            is_settled = (is_settled OR ?), updated_at = ?
        WHERE debt_id = ? AND user_id = ?
        RETURNING {DEBT_COLUMNS}
        "#
    ))
    .bind(debt.person_id)
    .bind(&debt.name)
    .bind(&debt.debt_type)
    .bind(fmt_money(&debt.principal))
    .bind(&debt.currency)
    .bind(&debt.description)
    .bind(fmt_money(&debt.interest_rate))
    .bind(fmt_money(&debt.minimum_payment))
    .bind(debt.due_date)
    .bind(debt.is_settled)
    .bind(now())
    .bind(debt.debt_id)
    .bind(debt.user_id)
    .fetch_one(pool)
    .await?;

    debt_from_row(&row)
}

// Distinct non-empty debt types the user has used, alphabetical
pub async fn list_debt_types(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT debt_type
        FROM debts
        WHERE user_id = ? AND debt_type IS NOT NULL AND debt_type <> ''
        ORDER BY debt_type ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

// Delete debt; its payments cascade
pub async fn delete_debt(pool: &Pool<Sqlite>, user_id: i64, debt_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM debts WHERE debt_id = ? AND user_id = ?")
        .bind(debt_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Payment Queries=========== */

pub async fn list_payments_for_debt(pool: &Pool<Sqlite>, debt_id: i64) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query(&format!(
        r#"
        SELECT {PAYMENT_COLUMNS}
        FROM payments
        WHERE debt_id = ?
        ORDER BY payment_date ASC, payment_id ASC
        "#
    ))
    .bind(debt_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(payment_from_row)
    .collect()
}

// Every payment on every debt the user owns
pub async fn list_payments_for_user(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT p.payment_id, p.debt_id, p.plan_id, p.amount, p.payment_date, p.status,
               p.note, p.created_at
        FROM payments p
        JOIN debts d ON d.debt_id = p.debt_id
        WHERE d.user_id = ?
        ORDER BY p.payment_date ASC, p.payment_id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(payment_from_row)
    .collect()
}

/* Recording a payment is atomic: the debt and its payments are read, the new
amount is checked against the outstanding balance, the payment is inserted and
the settlement flag is raised if the balance reached zero. Either all of it
commits or none of it does. The transaction takes the write lock up front so
two concurrent payments queue instead of both reading the same balance. */

pub async fn record_payment(
    pool: &Pool<Sqlite>,
    user_id: i64,
    debt_id: i64,
    payment: &NewPayment,
) -> ApiResult<(Payment, Balance)> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let debt = sqlx::query(&format!(
        "SELECT {DEBT_COLUMNS} FROM debts WHERE debt_id = ? AND user_id = ?"
    ))
    .bind(debt_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .as_ref()
    .map(debt_from_row)
    .transpose()?
    .ok_or_else(|| ApiError::not_found("Debt not found"))?;

    let paid_rows = sqlx::query("SELECT amount FROM payments WHERE debt_id = ?")
        .bind(debt_id)
        .fetch_all(&mut *tx)
        .await?;
    let paid = paid_rows
        .iter()
        .map(|r| money(r, "amount"))
        .sum::<Result<Decimal, sqlx::Error>>()?;

    let before = balance::from_parts(debt.principal, paid, debt.is_settled);
    let after = balance::apply_payment(&before, payment.amount)?;

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO payments (debt_id, plan_id, amount, payment_date, status, note, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {PAYMENT_COLUMNS}
        "#
    ))
    .bind(debt_id)
    .bind(payment.plan_id)
    .bind(fmt_money(&payment.amount))
    .bind(payment.payment_date)
    .bind(payment.status.as_str())
    .bind(&payment.note)
    .bind(now())
    .fetch_one(&mut *tx)
    .await?;
    let created = payment_from_row(&row)?;

    if after.settled && !debt.is_settled {
        sqlx::query("UPDATE debts SET is_settled = 1, updated_at = ? WHERE debt_id = ?")
            .bind(now())
            .bind(debt_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok((created, after))
}

/*==========Repayment Plan Queries=========== */

#[allow(clippy::too_many_arguments)]
pub async fn create_plan(
    pool: &Pool<Sqlite>,
    user_id: i64,
    name: Option<&str>,
    strategy: Strategy,
    monthly_budget: Decimal,
    projected_months: i64,
    projected_interest: Decimal,
    projected_payoff_date: Option<NaiveDate>,
) -> Result<RepaymentPlan, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO repayment_plans (
            user_id, name, strategy, monthly_budget, projected_months,
            projected_interest, projected_payoff_date, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(name)
    .bind(strategy.as_str())
    .bind(fmt_money(&monthly_budget))
    .bind(projected_months)
    .bind(fmt_money(&projected_interest))
    .bind(projected_payoff_date)
    .bind(now())
    .fetch_one(pool)
    .await?;

    plan_from_row(&row)
}

pub async fn list_plans(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<RepaymentPlan>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {PLAN_COLUMNS} FROM repayment_plans WHERE user_id = ? ORDER BY plan_id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(plan_from_row)
    .collect()
}

pub async fn get_plan(
    pool: &Pool<Sqlite>,
    user_id: i64,
    plan_id: i64,
) -> Result<Option<RepaymentPlan>, sqlx::Error> {
    sqlx::query(&format!(
        "SELECT {PLAN_COLUMNS} FROM repayment_plans WHERE plan_id = ? AND user_id = ?"
    ))
    .bind(plan_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .as_ref()
    .map(plan_from_row)
    .transpose()
}

/*==========Badge Queries=========== */

pub async fn list_active_badges(pool: &Pool<Sqlite>) -> Result<Vec<Badge>, sqlx::Error> {
    sqlx::query_as::<_, Badge>("SELECT * FROM badges WHERE is_active = 1 ORDER BY badge_id ASC")
        .fetch_all(pool)
        .await
}

pub async fn list_user_badges(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<UserBadge>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT ub.user_badge_id, ub.earned_at,
               b.badge_id, b.code, b.name, b.description, b.icon, b.is_active, b.created_at
        FROM user_badges ub
        JOIN badges b ON b.badge_id = ub.badge_id
        WHERE ub.user_id = ?
        ORDER BY ub.earned_at ASC, ub.user_badge_id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| {
        let earned_at: NaiveDateTime = row.try_get("earned_at")?;
        Ok(UserBadge {
            id: row.try_get("user_badge_id")?,
            badge_id: row.try_get("badge_id")?,
            earned_at,
            badge: Badge {
                id: row.try_get("badge_id")?,
                code: row.try_get("code")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                icon: row.try_get("icon")?,
                is_active: row.try_get("is_active")?,
                created_at: row.try_get("created_at")?,
            },
        })
    })
    .collect::<Result<Vec<UserBadge>, sqlx::Error>>()
}

/// Awards each badge the user does not hold yet and refreshes their level.
/// Returns the codes that were newly awarded.
pub async fn award_badges(
    pool: &Pool<Sqlite>,
    user_id: i64,
    codes: &[BadgeCode],
) -> Result<Vec<BadgeCode>, sqlx::Error> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
    let at = now();
    let mut awarded = Vec::new();

    for code in codes {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, earned_at)
            SELECT ?, badge_id, ? FROM badges WHERE code = ? AND is_active = 1
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(at)
        .bind(code.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            awarded.push(*code);
        }
    }

    sqlx::query(
        r#"
        UPDATE users
        SET level = 1 + (SELECT COUNT(*) FROM user_badges WHERE user_id = ?)
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(awarded)
}
