//! Runtime configuration for the API server, validated once at startup.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use crate::cli::ServeArgs;

/// Signing secret used when none is configured. Fine for local runs only.
pub const DEFAULT_SECRET: &str = "change_this_in_prod";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECRET_KEY must not be empty")]
    EmptySecret,
    #[error("ACCESS_TOKEN_EXPIRE_MINUTES must be positive, got {0}")]
    NonPositiveTtl(i64),
    #[error("DB_MAX_CONNECTIONS must be at least 1")]
    NoConnections,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind: SocketAddr,
    pub secret_key: String,
    pub token_ttl: Duration,
}

impl AppConfig {
    pub fn from_args(args: &ServeArgs) -> Result<Self, ConfigError> {
        if args.secret_key.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if args.token_ttl_minutes <= 0 {
            return Err(ConfigError::NonPositiveTtl(args.token_ttl_minutes));
        }
        if args.database.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        if args.secret_key == DEFAULT_SECRET {
            tracing::warn!("SECRET_KEY is not set; using the built-in development secret");
        }

        Ok(Self {
            database_url: args.database.database_url.clone(),
            max_connections: args.database.max_connections,
            bind: args.bind,
            secret_key: args.secret_key.clone(),
            token_ttl: Duration::minutes(args.token_ttl_minutes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DatabaseArgs;

    fn args() -> ServeArgs {
        ServeArgs {
            database: DatabaseArgs {
                database_url: "sqlite::memory:".into(),
                max_connections: 5,
            },
            bind: "127.0.0.1:3000".parse().unwrap(),
            secret_key: "secret".into(),
            token_ttl_minutes: 30,
        }
    }

    #[test]
    fn valid_args_build_config() {
        let cfg = AppConfig::from_args(&args()).unwrap();
        assert_eq!(cfg.token_ttl, Duration::minutes(30));
        assert_eq!(cfg.bind.port(), 3000);
    }

    #[test]
    fn rejects_bad_values() {
        let mut a = args();
        a.secret_key = "  ".into();
        assert_eq!(AppConfig::from_args(&a).unwrap_err(), ConfigError::EmptySecret);

        let mut a = args();
        a.token_ttl_minutes = 0;
        assert_eq!(AppConfig::from_args(&a).unwrap_err(), ConfigError::NonPositiveTtl(0));

        let mut a = args();
        a.database.max_connections = 0;
        assert_eq!(AppConfig::from_args(&a).unwrap_err(), ConfigError::NoConnections);
    }
}
