//! Command-line interface for the `debt-tracker` binary.
//!
//! Every flag falls back to an environment variable, and `.env` is loaded
//! before parsing, so a deployment can be configured entirely from the
//! environment.

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

/// Personal debt tracking API.
#[derive(Parser, Debug)]
#[command(name = "debt-tracker", version, about, propagate_version = true)]
pub struct DebtTrackerCli {
    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "debt_tracker=info,tower_http=info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply migrations and serve the HTTP API.
    Serve(ServeArgs),
    /// Apply pending migrations and exit.
    Migrate(DatabaseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// SQLite connection string.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://debt_tracker.db?mode=rwc")]
    pub database_url: String,

    /// Upper bound on pooled connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Address the API listens on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// HS256 signing secret for access tokens.
    #[arg(long, env = "SECRET_KEY", default_value = crate::config::DEFAULT_SECRET, hide_env_values = true)]
    pub secret_key: String,

    /// Access token lifetime in minutes.
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = 60 * 24)]
    pub token_ttl_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        DebtTrackerCli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = DebtTrackerCli::try_parse_from([
            "debt-tracker",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--secret-key",
            "s3cret",
            "--token-ttl-minutes",
            "15",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind.port(), 8080);
                assert_eq!(args.secret_key, "s3cret");
                assert_eq!(args.token_ttl_minutes, 15);
                assert_eq!(args.database.database_url, "sqlite::memory:");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
