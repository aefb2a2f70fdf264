// src/main.rs
use clap::Parser;
use debt_tracker::backend;
use debt_tracker::cli::{Commands, DebtTrackerCli};
use debt_tracker::config::AppConfig;
use debt_tracker::database::db::{connection, migrate};
use debt_tracker::logging::{init_logging, LogFormat};
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = DebtTrackerCli::parse();
    init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format))?;

    match cli.command {
        Commands::Serve(args) => {
            let config = AppConfig::from_args(&args)?;
            tracing::info!(
                database = %config.database_url,
                bind = %config.bind,
                token_ttl_minutes = config.token_ttl.num_minutes(),
                "starting debt-tracker"
            );
            backend::run_server(config).await?;
        }
        Commands::Migrate(args) => {
            let pool = connection::get_db_pool(&args.database_url, args.max_connections).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
        }
    }
    Ok(())
}
