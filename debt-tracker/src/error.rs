//! API error type and its HTTP mapping.
//!
//! | Variant        | Status | When                                              |
//! |----------------|--------|---------------------------------------------------|
//! | `Unauthorized` | 401    | bad credentials, missing/invalid/expired token    |
//! | `NotFound`     | 404    | unknown id, or a row owned by another user        |
//! | `Validation`   | 400    | malformed input or a business-rule violation      |
//! | `Database`     | 500    | any `sqlx` failure; not retried                   |
//! | `Internal`     | 500    | hashing or signing failures                       |
//!
//! Bodies are `{"detail": "..."}`. Server-side failures are logged and the
//! client only sees a generic message.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::balance::PaymentRejected;
use crate::repayment::PlanError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Expired => Self::unauthorized("Token expired"),
            AuthError::InvalidToken => Self::unauthorized("Invalid auth"),
            AuthError::Hash(_) | AuthError::MalformedHash(_) | AuthError::Sign(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<PaymentRejected> for ApiError {
    fn from(e: PaymentRejected) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<PlanError> for ApiError {
    fn from(e: PlanError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "detail": detail }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
