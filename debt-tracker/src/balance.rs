//! Outstanding balance and settlement for a single debt.
//!
//! `outstanding = principal - sum(payments)`, counting every recorded payment
//! whatever its status. The result is not clamped: it can go negative when a
//! principal is edited below what has already been paid.
//!
//! Settlement is one-way. Once a debt is settled it stays settled, even if a
//! later edit raises the principal again.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::database::models::{Debt, Payment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub principal: Decimal,
    pub paid: Decimal,
    pub outstanding: Decimal,
    pub settled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentRejected {
    #[error("payment amount must be greater than zero")]
    NonPositive,
    #[error("debt is already settled")]
    AlreadySettled,
    #[error("payment of {amount} exceeds outstanding balance of {outstanding}")]
    Overpayment { amount: Decimal, outstanding: Decimal },
}

pub fn outstanding<I>(principal: Decimal, amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    principal - amounts.into_iter().sum::<Decimal>()
}

/// Balance of `debt` given every payment recorded against it.
pub fn summarize(debt: &Debt, payments: &[Payment]) -> Balance {
    let paid: Decimal = payments
        .iter()
        .filter(|p| p.debt_id == debt.debt_id)
        .map(|p| p.amount)
        .sum();
    from_parts(debt.principal, paid, debt.is_settled)
}

pub fn from_parts(principal: Decimal, paid: Decimal, already_settled: bool) -> Balance {
    let left = outstanding(principal, [paid]);
    Balance {
        principal,
        paid,
        outstanding: left,
        settled: already_settled || left <= Decimal::ZERO,
    }
}

/// Balance after recording a payment of `amount`.
///
/// Overpayments are refused rather than driving the balance negative.
pub fn apply_payment(current: &Balance, amount: Decimal) -> Result<Balance, PaymentRejected> {
    if amount <= Decimal::ZERO {
        return Err(PaymentRejected::NonPositive);
    }
    if current.outstanding <= Decimal::ZERO {
        return Err(PaymentRejected::AlreadySettled);
    }
    if amount > current.outstanding {
        return Err(PaymentRejected::Overpayment {
            amount,
            outstanding: current.outstanding,
        });
    }
    Ok(from_parts(current.principal, current.paid + amount, current.settled))
}
