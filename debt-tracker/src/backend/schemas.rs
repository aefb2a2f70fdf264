//! Request and response bodies. Input validation lives next to the request
//! types so handlers receive values that are already normalized.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::Balance;
use crate::database::models::{Debt, NewDebt, NewPayment, Payment, PaymentStatus, RepaymentPlan};
use crate::error::{ApiError, ApiResult};
use crate::repayment::{Schedule, Strategy};
use crate::util::{normalize_money, now};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const DEFAULT_CURRENCY: &str = "USD";

/* ========== Auth ========== */

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// OAuth2 password-flow form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, ttl: chrono::Duration) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: ttl.num_seconds(),
        }
    }
}

pub fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(email)
}

pub fn check_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/* ========== People ========== */

#[derive(Debug, Deserialize)]
pub struct PersonCreate {
    pub name: String,
    pub contact: Option<String>,
}

/* ========== Debts ========== */

#[derive(Debug, Deserialize)]
pub struct DebtCreate {
    pub person_id: Option<i64>,
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub debt_type: Option<String>,
    pub principal: Decimal,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub interest_rate: Option<Decimal>,
    pub minimum_payment: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct DebtUpdate {
    pub person_id: Option<i64>,
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub debt_type: Option<String>,
    pub principal: Option<Decimal>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub interest_rate: Option<Decimal>,
    pub minimum_payment: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

fn positive_money(field: &str, v: Decimal) -> ApiResult<Decimal> {
    let v = normalize_money(v).map_err(|e| ApiError::validation(format!("{field}: {e}")))?;
    if v <= Decimal::ZERO {
        return Err(ApiError::validation(format!("{field} must be greater than zero")));
    }
    Ok(v)
}

fn non_negative_money(field: &str, v: Decimal) -> ApiResult<Decimal> {
    let v = normalize_money(v).map_err(|e| ApiError::validation(format!("{field}: {e}")))?;
    if v < Decimal::ZERO {
        return Err(ApiError::validation(format!("{field} must not be negative")));
    }
    Ok(v)
}

fn interest_rate(v: Decimal) -> ApiResult<Decimal> {
    let v = non_negative_money("interest_rate", v)?;
    if v > Decimal::ONE_HUNDRED {
        return Err(ApiError::validation("interest_rate is a percentage between 0 and 100"));
    }
    Ok(v)
}

fn currency(raw: &str) -> ApiResult<String> {
    let c = raw.trim().to_ascii_uppercase();
    if c.len() != 3 || !c.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(ApiError::validation("currency must be a 3-letter code"));
    }
    Ok(c)
}

fn trimmed(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl DebtCreate {
    pub fn validate(self) -> ApiResult<NewDebt> {
        Ok(NewDebt {
            person_id: self.person_id,
            name: trimmed(self.name),
            debt_type: trimmed(self.debt_type),
            principal: positive_money("principal", self.principal)?,
            currency: currency(self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY))?,
            description: trimmed(self.description),
            interest_rate: interest_rate(self.interest_rate.unwrap_or(Decimal::ZERO))?,
            minimum_payment: non_negative_money(
                "minimum_payment",
                self.minimum_payment.unwrap_or(Decimal::ZERO),
            )?,
            due_date: self.due_date,
        })
    }
}

impl DebtUpdate {
    /// Applies the provided fields onto `debt`, validating each one.
    pub fn apply(self, debt: &mut Debt) -> ApiResult<()> {
        if let Some(person_id) = self.person_id {
            debt.person_id = Some(person_id);
        }
        if self.name.is_some() {
            debt.name = trimmed(self.name);
        }
        if self.debt_type.is_some() {
            debt.debt_type = trimmed(self.debt_type);
        }
        if let Some(p) = self.principal {
            debt.principal = positive_money("principal", p)?;
        }
        if let Some(c) = self.currency {
            debt.currency = currency(&c)?;
        }
        if self.description.is_some() {
            debt.description = trimmed(self.description);
        }
        if let Some(r) = self.interest_rate {
            debt.interest_rate = interest_rate(r)?;
        }
        if let Some(m) = self.minimum_payment {
            debt.minimum_payment = non_negative_money("minimum_payment", m)?;
        }
        if let Some(d) = self.due_date {
            debt.due_date = Some(d);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DebtRead {
    pub id: i64,
    pub person_id: Option<i64>,
    pub name: Option<String>,
    pub debt_type: Option<String>,
    pub principal: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    pub due_date: Option<NaiveDate>,
    pub is_settled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub paid: Decimal,
    pub outstanding: Decimal,
}

impl DebtRead {
    pub fn new(debt: Debt, balance: &Balance) -> Self {
        Self {
            id: debt.debt_id,
            person_id: debt.person_id,
            name: debt.name,
            debt_type: debt.debt_type,
            principal: debt.principal,
            currency: debt.currency,
            description: debt.description,
            interest_rate: debt.interest_rate,
            minimum_payment: debt.minimum_payment,
            due_date: debt.due_date,
            is_settled: debt.is_settled,
            created_at: debt.created_at,
            updated_at: debt.updated_at,
            paid: balance.paid,
            outstanding: balance.outstanding,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<u32>,
}

/* ========== Payments ========== */

#[derive(Debug, Deserialize)]
pub struct PaymentCreate {
    pub amount: Decimal,
    pub payment_date: Option<NaiveDateTime>,
    pub status: Option<PaymentStatus>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    pub plan_id: Option<i64>,
}

impl PaymentCreate {
    pub fn validate(self, plan_id: Option<i64>) -> ApiResult<NewPayment> {
        Ok(NewPayment {
            plan_id,
            amount: positive_money("amount", self.amount)?,
            payment_date: self.payment_date.unwrap_or_else(now),
            status: self.status.unwrap_or_default(),
            note: trimmed(self.note),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentRead {
    pub id: i64,
    pub debt_id: i64,
    pub plan_id: Option<i64>,
    pub amount: Decimal,
    pub payment_date: NaiveDateTime,
    pub status: PaymentStatus,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<Payment> for PaymentRead {
    fn from(p: Payment) -> Self {
        Self {
            id: p.payment_id,
            debt_id: p.debt_id,
            plan_id: p.plan_id,
            amount: p.amount,
            payment_date: p.payment_date,
            status: p.status,
            note: p.note,
            created_at: p.created_at,
        }
    }
}

/// A newly recorded payment plus the debt's balance after it.
#[derive(Debug, Serialize)]
pub struct PaymentCreated {
    #[serde(flatten)]
    pub payment: PaymentRead,
    pub outstanding: Decimal,
    pub is_settled: bool,
}

/* ========== Repayment plans ========== */

#[derive(Debug, Deserialize)]
pub struct PlanCreate {
    pub name: Option<String>,
    pub strategy: Strategy,
    pub monthly_budget: Option<Decimal>,
}

impl PlanCreate {
    pub fn budget(&self) -> ApiResult<Option<Decimal>> {
        self.monthly_budget
            .map(|b| non_negative_money("monthly_budget", b))
            .transpose()
    }
}

#[derive(Debug, Serialize)]
pub struct PlanRead {
    pub id: i64,
    pub name: Option<String>,
    pub strategy: Strategy,
    pub monthly_budget: Decimal,
    pub projected_months: i64,
    pub projected_interest: Decimal,
    pub projected_payoff_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    /// Schedule recomputed against the debts as they stand now.
    pub schedule: Option<Schedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_error: Option<String>,
}

impl PlanRead {
    pub fn new(plan: RepaymentPlan, schedule: Result<Schedule, String>) -> Self {
        let (schedule, schedule_error) = match schedule {
            Ok(s) => (Some(s), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            id: plan.plan_id,
            name: plan.name,
            strategy: plan.strategy,
            monthly_budget: plan.monthly_budget,
            projected_months: plan.projected_months,
            projected_interest: plan.projected_interest,
            projected_payoff_date: plan.projected_payoff_date,
            created_at: plan.created_at,
            schedule,
            schedule_error,
        }
    }
}

/// Summary window plus optional debt filters. Balance bounds apply to the
/// outstanding amount; due-date bounds are inclusive and skip undated debts.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub projection_days: Option<u32>,
    #[serde(rename = "type", alias = "debt_type")]
    pub debt_type: Option<String>,
    #[serde(alias = "minBalance")]
    pub min_balance: Option<Decimal>,
    #[serde(alias = "maxBalance")]
    pub max_balance: Option<Decimal>,
    #[serde(alias = "dueBefore")]
    pub due_before: Option<NaiveDate>,
    #[serde(alias = "dueAfter")]
    pub due_after: Option<NaiveDate>,
}

impl SummaryQuery {
    pub fn matches(&self, debt: &Debt, balance: &Balance) -> bool {
        if let Some(t) = self.debt_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if debt.debt_type.as_deref() != Some(t) {
                return false;
            }
        }
        if self.min_balance.is_some_and(|min| balance.outstanding < min) {
            return false;
        }
        if self.max_balance.is_some_and(|max| balance.outstanding > max) {
            return false;
        }
        if self.due_before.is_some() || self.due_after.is_some() {
            let Some(due) = debt.due_date else {
                return false;
            };
            if self.due_before.is_some_and(|d| due > d) || self.due_after.is_some_and(|d| due < d) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "alice", "@example.com", "alice@", "alice@localhost", "a@b@c.com", "a@.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(check_password("short").is_err());
        assert!(check_password("longenough").is_ok());
    }

    fn debt_create(principal: &str) -> DebtCreate {
        DebtCreate {
            person_id: None,
            name: Some("  Visa  ".into()),
            debt_type: None,
            principal: Decimal::from_str(principal).unwrap(),
            currency: Some("cad".into()),
            description: Some("   ".into()),
            interest_rate: None,
            minimum_payment: None,
            due_date: None,
        }
    }

    #[test]
    fn debt_create_normalizes_fields() {
        let d = debt_create("100").validate().unwrap();
        assert_eq!(d.principal.to_string(), "100.00");
        assert_eq!(d.currency, "CAD");
        assert_eq!(d.name.as_deref(), Some("Visa"));
        assert_eq!(d.description, None);
        assert_eq!(d.interest_rate.to_string(), "0.00");
    }

    #[test]
    fn debt_create_rejects_bad_principal() {
        assert!(debt_create("0").validate().is_err());
        assert!(debt_create("-5").validate().is_err());
        assert!(debt_create("1.005").validate().is_err());
    }

    #[test]
    fn debt_create_rejects_bad_currency_and_rate() {
        let mut d = debt_create("10");
        d.currency = Some("dollars".into());
        assert!(d.validate().is_err());

        let mut d = debt_create("10");
        d.interest_rate = Some(Decimal::from(101));
        assert!(d.validate().is_err());
    }

    #[test]
    fn payment_defaults_to_paid_now() {
        let p = PaymentCreate {
            amount: Decimal::from_str("12.5").unwrap(),
            payment_date: None,
            status: None,
            note: None,
        }
        .validate(Some(3))
        .unwrap();
        assert_eq!(p.amount.to_string(), "12.50");
        assert_eq!(p.status, PaymentStatus::Paid);
        assert_eq!(p.plan_id, Some(3));
    }

    #[test]
    fn payment_amount_must_be_positive() {
        let p = PaymentCreate {
            amount: Decimal::ZERO,
            payment_date: None,
            status: None,
            note: None,
        };
        assert!(p.validate(None).is_err());
    }

    fn open_debt(debt_type: Option<&str>, due: Option<NaiveDate>) -> Debt {
        Debt {
            debt_id: 1,
            user_id: 1,
            person_id: None,
            name: None,
            debt_type: debt_type.map(str::to_string),
            principal: Decimal::from(500),
            currency: "USD".into(),
            description: None,
            interest_rate: Decimal::ZERO,
            minimum_payment: Decimal::ZERO,
            due_date: due,
            is_settled: false,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn owing(outstanding: i64) -> Balance {
        Balance {
            principal: Decimal::from(500),
            paid: Decimal::from(500 - outstanding),
            outstanding: Decimal::from(outstanding),
            settled: false,
        }
    }

    #[test]
    fn summary_filter_defaults_to_everything() {
        let q = SummaryQuery::default();
        assert!(q.matches(&open_debt(None, None), &owing(500)));
    }

    #[test]
    fn summary_filter_checks_type_and_balance() {
        let q = SummaryQuery {
            debt_type: Some("Loan".into()),
            min_balance: Some(Decimal::from(100)),
            max_balance: Some(Decimal::from(400)),
            ..Default::default()
        };
        assert!(q.matches(&open_debt(Some("Loan"), None), &owing(250)));
        assert!(!q.matches(&open_debt(Some("Credit Card"), None), &owing(250)));
        assert!(!q.matches(&open_debt(Some("Loan"), None), &owing(50)));
        assert!(!q.matches(&open_debt(Some("Loan"), None), &owing(450)));
    }

    #[test]
    fn summary_filter_due_window_is_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        let q = SummaryQuery {
            due_after: Some(day(10)),
            due_before: Some(day(20)),
            ..Default::default()
        };
        assert!(q.matches(&open_debt(None, Some(day(10))), &owing(10)));
        assert!(q.matches(&open_debt(None, Some(day(20))), &owing(10)));
        assert!(!q.matches(&open_debt(None, Some(day(21))), &owing(10)));
        assert!(!q.matches(&open_debt(None, None), &owing(10)));
    }

    #[test]
    fn payment_body_accepts_numbers_and_strings() {
        let a: PaymentCreate = serde_json::from_str(r#"{"amount": 40}"#).unwrap();
        let b: PaymentCreate = serde_json::from_str(r#"{"amount": "40.00", "status": "planned"}"#).unwrap();
        assert_eq!(a.amount, b.amount);
        assert_eq!(b.status, Some(PaymentStatus::Planned));
    }
}
