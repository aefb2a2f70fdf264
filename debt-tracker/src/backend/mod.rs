mod extract;
mod handlers;
mod routes;
pub mod schemas;

use axum::{
    http::{header, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::db::{connection, migrate};

pub use extract::{AppForm, AppJson, AppPath, AppQuery, CurrentUser};

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, tokens: TokenService) -> Self {
        Self { db, tokens }
    }
}

/// Full application router: health check, API routes, CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .merge(routes::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let pool = connection::get_db_pool(&config.database_url, config.max_connections).await?;
    migrate::run_migrations(&pool).await?;

    let state = AppState::new(pool, TokenService::new(&config.secret_key, config.token_ttl));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
