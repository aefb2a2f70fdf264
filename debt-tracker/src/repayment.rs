//! Repayment strategies and payoff projection.
//!
//! * snowball: smallest outstanding balance first, ties by higher interest
//! * avalanche: highest interest rate first, ties by smaller balance
//! * ai_recommended: simulates both and keeps whichever pays less interest
//!
//! [`simulate`] walks month by month: interest accrues, every minimum is paid,
//! and whatever is left of the monthly budget goes to the debts in strategy
//! order. [`project`] is the short-horizon dashboard estimate and does not
//! depend on the strategy.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::add_months;

/// Simulations give up after fifty years.
pub const MAX_MONTHS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Snowball,
    Avalanche,
    #[serde(alias = "ai-recommended")]
    AiRecommended,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snowball => "snowball",
            Self::Avalanche => "avalanche",
            Self::AiRecommended => "ai_recommended",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "snowball" => Ok(Self::Snowball),
            "avalanche" => Ok(Self::Avalanche),
            "ai_recommended" => Ok(Self::AiRecommended),
            other => Err(format!("unknown repayment strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("monthly budget {budget} is below the total minimum payment of {minimums}")]
    BudgetBelowMinimums { budget: Decimal, minimums: Decimal },
    #[error("monthly budget must not be negative")]
    NegativeBudget,
    #[error("debts are not paid off within {MAX_MONTHS} months at this budget")]
    NeverPaysOff,
}

/// The slice of a debt the planner cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanDebt {
    pub debt_id: i64,
    pub name: Option<String>,
    pub outstanding: Decimal,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtPayoff {
    pub debt_id: i64,
    pub name: Option<String>,
    pub payoff_month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub strategy: Strategy,
    /// Ordering actually used; differs from `strategy` only for ai_recommended.
    pub basis: Strategy,
    pub monthly_budget: Decimal,
    pub months: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    pub payoffs: Vec<DebtPayoff>,
}

impl Schedule {
    pub fn payoff_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        (self.months > 0).then(|| add_months(start, self.months))
    }
}

/// Debts with something left to pay, in the order `strategy` attacks them.
pub fn order(strategy: Strategy, debts: &[PlanDebt]) -> Vec<PlanDebt> {
    let mut active: Vec<PlanDebt> = debts
        .iter()
        .filter(|d| d.outstanding > Decimal::ZERO)
        .cloned()
        .collect();

    match strategy {
        Strategy::Snowball | Strategy::AiRecommended => active.sort_by(snowball_cmp),
        Strategy::Avalanche => active.sort_by(avalanche_cmp),
    }
    active
}

fn snowball_cmp(a: &PlanDebt, b: &PlanDebt) -> Ordering {
    a.outstanding
        .cmp(&b.outstanding)
        .then_with(|| b.interest_rate.cmp(&a.interest_rate))
        .then_with(|| a.debt_id.cmp(&b.debt_id))
}

fn avalanche_cmp(a: &PlanDebt, b: &PlanDebt) -> Ordering {
    b.interest_rate
        .cmp(&a.interest_rate)
        .then_with(|| a.outstanding.cmp(&b.outstanding))
        .then_with(|| a.debt_id.cmp(&b.debt_id))
}

pub fn total_minimums(debts: &[PlanDebt]) -> Decimal {
    debts
        .iter()
        .filter(|d| d.outstanding > Decimal::ZERO)
        .map(|d| d.minimum_payment)
        .sum()
}

/// Month-by-month payoff schedule. `monthly_budget` defaults to the sum of
/// minimum payments.
pub fn simulate(
    strategy: Strategy,
    debts: &[PlanDebt],
    monthly_budget: Option<Decimal>,
) -> Result<Schedule, PlanError> {
    if strategy != Strategy::AiRecommended {
        return run(strategy, strategy, debts, monthly_budget);
    }

    let snowball = run(Strategy::AiRecommended, Strategy::Snowball, debts, monthly_budget);
    let avalanche = run(Strategy::AiRecommended, Strategy::Avalanche, debts, monthly_budget);
    match (snowball, avalanche) {
        (Ok(snow), Ok(aval)) => {
            let prefer_avalanche = (aval.total_interest, aval.months) < (snow.total_interest, snow.months);
            Ok(if prefer_avalanche { aval } else { snow })
        }
        // an ordering that never pays off loses to one that does
        (Ok(snow), Err(_)) => Ok(snow),
        (Err(_), Ok(aval)) => Ok(aval),
        (Err(e), Err(_)) => Err(e),
    }
}

struct Slot {
    debt_id: i64,
    name: Option<String>,
    balance: Decimal,
    rate: Decimal,
    minimum: Decimal,
    paid_off: Option<u32>,
}

fn run(
    label: Strategy,
    basis: Strategy,
    debts: &[PlanDebt],
    monthly_budget: Option<Decimal>,
) -> Result<Schedule, PlanError> {
    let minimums = total_minimums(debts);
    let budget = monthly_budget.unwrap_or(minimums);
    if budget < Decimal::ZERO {
        return Err(PlanError::NegativeBudget);
    }
    if budget < minimums {
        return Err(PlanError::BudgetBelowMinimums { budget, minimums });
    }

    let mut slots: Vec<Slot> = order(basis, debts)
        .into_iter()
        .map(|d| Slot {
            debt_id: d.debt_id,
            name: d.name,
            balance: d.outstanding,
            rate: d.interest_rate,
            minimum: d.minimum_payment,
            paid_off: None,
        })
        .collect();

    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut months = 0;
    let twelve_hundred = Decimal::from(1200);

    while slots.iter().any(|s| s.paid_off.is_none()) {
        if months == MAX_MONTHS {
            return Err(PlanError::NeverPaysOff);
        }
        months += 1;

        for s in slots.iter_mut().filter(|s| s.paid_off.is_none()) {
            let interest = (s.balance * s.rate / twelve_hundred).round_dp(2);
            s.balance += interest;
            total_interest += interest;
        }

        let mut remaining = budget;
        for s in slots.iter_mut().filter(|s| s.paid_off.is_none()) {
            let pay = s.minimum.min(s.balance).min(remaining);
            s.balance -= pay;
            remaining -= pay;
            total_paid += pay;
        }
        for s in slots.iter_mut().filter(|s| s.paid_off.is_none()) {
            if remaining <= Decimal::ZERO {
                break;
            }
            let pay = remaining.min(s.balance);
            s.balance -= pay;
            remaining -= pay;
            total_paid += pay;
        }

        for s in slots.iter_mut().filter(|s| s.paid_off.is_none()) {
            if s.balance <= Decimal::ZERO {
                s.paid_off = Some(months);
            }
        }
    }

    let mut payoffs: Vec<DebtPayoff> = slots
        .into_iter()
        .map(|s| DebtPayoff {
            debt_id: s.debt_id,
            name: s.name,
            payoff_month: s.paid_off.unwrap_or(months),
        })
        .collect();
    // stable: ties keep strategy order
    payoffs.sort_by_key(|p| p.payoff_month);

    Ok(Schedule {
        strategy: label,
        basis,
        monthly_budget: budget,
        months,
        total_interest,
        total_paid,
        payoffs,
    })
}

/// Short-horizon summary shown on the plan dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub total_balance: Decimal,
    pub projected_balance_after: Decimal,
    pub past_payments: Decimal,
    pub projected_future_payments: Decimal,
    pub projected_interest: Decimal,
    pub payoff_months: u32,
    pub payoff_estimate: String,
    pub projection_start: NaiveDate,
    pub projection_end: NaiveDate,
    pub projection_days: u32,
    pub total_debts: usize,
}

pub fn project(debts: &[PlanDebt], past_payments: Decimal, days: u32, today: NaiveDate) -> Projection {
    let days_dec = Decimal::from(days);
    let per_day = Decimal::from(100 * 12 * 30);

    let mut projected_interest = Decimal::ZERO;
    let mut projected_future = Decimal::ZERO;
    let mut payoff_months = 0u32;

    for d in debts {
        let interest = d.outstanding * d.interest_rate * days_dec / per_day;
        projected_interest += interest;
        projected_future += (d.outstanding + interest).min(d.minimum_payment);

        let divisor = if d.minimum_payment > Decimal::ZERO {
            d.minimum_payment
        } else {
            Decimal::ONE
        };
        let months = (d.outstanding / divisor).ceil().to_u32().unwrap_or(u32::MAX);
        payoff_months = payoff_months.max(months);
    }

    let total_balance: Decimal = debts.iter().map(|d| d.outstanding).sum();
    let projected_interest = projected_interest.round_dp(2);
    let projected_future = projected_future.round_dp(2);

    Projection {
        total_balance,
        projected_balance_after: total_balance - projected_future + projected_interest,
        past_payments,
        projected_future_payments: projected_future,
        projected_interest,
        payoff_months,
        payoff_estimate: format!("{} yr {} mo", payoff_months / 12, payoff_months % 12),
        projection_start: today,
        projection_end: today + Duration::days(i64::from(days)),
        projection_days: days,
        total_debts: debts.len(),
    }
}
