use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::repayment::Strategy;

#[derive(Debug, Clone)]
pub struct RepaymentPlan {
    pub plan_id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub strategy: Strategy,
    pub monthly_budget: Decimal,
    // projected at creation time
    pub projected_months: i64,
    pub projected_interest: Decimal,
    pub projected_payoff_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}
