pub mod achievements;
pub mod auth;
pub mod backend;
pub mod balance;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod repayment;
pub mod util;
