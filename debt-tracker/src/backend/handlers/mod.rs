pub mod auth;
pub mod badges;
pub mod debts;
pub mod payments;
pub mod people;
pub mod plans;

use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use crate::balance::{self, Balance};
use crate::database::db::queries;
use crate::database::models::{Debt, Payment};
use crate::error::ApiResult;
use crate::repayment::PlanDebt;

/// Every debt of the user with its current balance, plus the raw payments.
pub(crate) async fn load_ledger(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> ApiResult<(Vec<(Debt, Balance)>, Vec<Payment>)> {
    let debts = queries::list_debts(pool, user_id).await?;
    let payments = queries::list_payments_for_user(pool, user_id).await?;
    let ledger = debts
        .into_iter()
        .map(|d| {
            let b = balance::summarize(&d, &payments);
            (d, b)
        })
        .collect();
    Ok((ledger, payments))
}

/// Unsettled debts that still have something to pay, as the planner sees them.
pub(crate) fn plan_debts(ledger: &[(Debt, Balance)]) -> Vec<PlanDebt> {
    ledger
        .iter()
        .filter(|(d, b)| !d.is_settled && b.outstanding > Decimal::ZERO)
        .map(|(d, b)| PlanDebt {
            debt_id: d.debt_id,
            name: d.name.clone(),
            outstanding: b.outstanding,
            interest_rate: d.interest_rate,
            minimum_payment: d.minimum_payment,
        })
        .collect()
}
