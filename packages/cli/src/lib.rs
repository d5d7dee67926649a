// ABOUTME: Server assembly for the Just Start binary
// ABOUTME: Opens the database, wires the AI-backed generator into the API, and serves it

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use juststart_ai::{AIService, ResearchClient};
use juststart_api::{create_router, AppState};
use juststart_storage::DatabaseConfig;
use juststart_wizard::AiContentGenerator;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub mod config;


use config::Config;

async fn open_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let db_config = DatabaseConfig::with_path(&config.database_path);
    juststart_storage::connect(&db_config)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_path.display()))
}

/// Apply pending migrations and exit
pub async fn run_migrations(config: &Config) -> anyhow::Result<()> {
    let pool = open_database(config).await?;
    pool.close().await;
    info!("Database at {} is up to date", config.database_path.display());
    Ok(())
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let pool = open_database(&config).await?;

    if config.anthropic_api_key.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; generation requests will fail");
    }
    if config.webhook_secret.is_none() {
        warn!("IDENTITY_WEBHOOK_SECRET is not set; identity webhooks will be rejected");
    }

    let generator = AiContentGenerator::new(
        AIService::with_api_key_and_model(
            config.anthropic_api_key.clone(),
            config.anthropic_model.clone(),
        ),
        ResearchClient::with_api_key_and_model(
            config.perplexity_api_key.clone(),
            config.perplexity_model.clone(),
        ),
    );

    let state = AppState::new(pool, Arc::new(generator), config.api_settings())
        .context("Invalid IDENTITY_WEBHOOK_SECRET")?;

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .context("Invalid CORS_ORIGIN")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    info!("Server listening on http://{}", addr);
    info!("CORS origin: {}", config.cors_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
