//! Badge rules.
//!
//! Rules are evaluated over a user's whole history after every accepted
//! payment; awarding is idempotent so re-evaluating is harmless.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::database::models::{Debt, Payment, PaymentStatus};

pub const HIGH_ROLLER_THRESHOLD: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeCode {
    FirstPayment,
    DebtCleared,
    HighRoller,
    Streak6,
    Streak12,
}

impl BadgeCode {
    pub const ALL: [BadgeCode; 5] = [
        Self::FirstPayment,
        Self::DebtCleared,
        Self::HighRoller,
        Self::Streak6,
        Self::Streak12,
    ];

    /// Matches `badges.code` in the seeded catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstPayment => "first_payment",
            Self::DebtCleared => "debt_cleared",
            Self::HighRoller => "high_roller",
            Self::Streak6 => "streak_6",
            Self::Streak12 => "streak_12",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub payment_count: usize,
    pub settled_debts: usize,
    pub total_paid: Decimal,
    /// Longest run of consecutive calendar months with a payment, on any one debt.
    pub longest_streak: usize,
}

pub fn stats(debts: &[Debt], payments: &[Payment]) -> ActivityStats {
    let mut months_by_debt: HashMap<i64, Vec<NaiveDate>> = HashMap::new();
    for p in payments.iter().filter(|p| p.status != PaymentStatus::Missed) {
        months_by_debt
            .entry(p.debt_id)
            .or_default()
            .push(p.payment_date.date());
    }

    ActivityStats {
        payment_count: payments.len(),
        settled_debts: debts.iter().filter(|d| d.is_settled).count(),
        total_paid: payments.iter().map(|p| p.amount).sum(),
        longest_streak: months_by_debt
            .into_values()
            .map(longest_monthly_streak)
            .max()
            .unwrap_or(0),
    }
}

pub fn earned(stats: &ActivityStats) -> Vec<BadgeCode> {
    BadgeCode::ALL
        .into_iter()
        .filter(|code| match code {
            BadgeCode::FirstPayment => stats.payment_count >= 1,
            BadgeCode::DebtCleared => stats.settled_debts >= 1,
            BadgeCode::HighRoller => stats.total_paid >= Decimal::from(HIGH_ROLLER_THRESHOLD),
            BadgeCode::Streak6 => stats.longest_streak >= 6,
            BadgeCode::Streak12 => stats.longest_streak >= 12,
        })
        .collect()
}

pub fn longest_monthly_streak<I>(dates: I) -> usize
where
    I: IntoIterator<Item = NaiveDate>,
{
    // months since year 0, deduplicated and sorted
    let months: BTreeSet<i32> = dates
        .into_iter()
        .map(|d| d.year() * 12 + d.month0() as i32)
        .collect();

    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<i32> = None;
    for m in months {
        run = match prev {
            Some(p) if m == p + 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(m);
    }
    best
}
