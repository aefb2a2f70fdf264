use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Debt {
    pub debt_id: i64,
    pub user_id: i64,
    pub person_id: Option<i64>,
    pub name: Option<String>,
    pub debt_type: Option<String>,     // "Credit Card", "Loan", ...
    pub principal: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub interest_rate: Decimal,        // annual, percent
    pub minimum_payment: Decimal,
    pub due_date: Option<NaiveDate>,
    pub is_settled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub person_id: Option<i64>,
    pub name: Option<String>,
    pub debt_type: Option<String>,
    pub principal: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    pub due_date: Option<NaiveDate>,
}
