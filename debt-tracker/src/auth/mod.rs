//! Credential handling: password hashing and signed access tokens.

pub mod password;
pub mod token;

use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("failed to sign token: {0}")]
    Sign(String),
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    InvalidToken,
}
