use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Planned,
    #[default]
    Paid,
    Missed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Paid => "paid",
            Self::Missed => "missed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "paid" => Ok(Self::Paid),
            "missed" => Ok(Self::Missed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub payment_id: i64,
    pub debt_id: i64,
    pub plan_id: Option<i64>,
    pub amount: Decimal,
    pub payment_date: NaiveDateTime,
    pub status: PaymentStatus,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub plan_id: Option<i64>,
    pub amount: Decimal,
    pub payment_date: NaiveDateTime,
    pub status: PaymentStatus,
    pub note: Option<String>,
}
