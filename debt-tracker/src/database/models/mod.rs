pub mod user;
pub mod person;
pub mod debt;
pub mod payment;
pub mod repayment_plan;
pub mod badge;

pub use user::{User, UserRead};
pub use person::Person;
pub use debt::{Debt, NewDebt};
pub use payment::{NewPayment, Payment, PaymentStatus};
pub use repayment_plan::RepaymentPlan;
pub use badge::{Badge, UserBadge};
