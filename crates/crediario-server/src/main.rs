//! HTTP server entry point for the Crediario loan service.
//!
//! Wires the persistence layer to the REST API: connects the
//! `PostgreSQL` pool, applies migrations (schema plus deterministic
//! seed data), and serves the strategy, change-tracker, raw-SQL, and
//! transaction route families until the process is terminated.

mod config;
mod error;

use std::sync::Arc;

use crediario_api::{AppState, ServerConfig, start_server};
use crediario_db::{PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::ServerInitError;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// connects to `PostgreSQL`, runs migrations, then serves HTTP
/// indefinitely.
///
/// # Errors
///
/// Returns an error if initialization or serving fails.
#[tokio::main]
async fn main() -> Result<(), ServerInitError> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("crediario-server starting");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        host = config.host,
        port = config.port,
        max_connections = config.max_connections,
        "configuration loaded"
    );

    // Connect to PostgreSQL and apply schema + seed migrations
    let pg_config =
        PostgresConfig::new(&config.database_url).with_max_connections(config.max_connections);
    let pool = PostgresPool::connect(&pg_config).await?;
    pool.run_migrations().await?;

    // Serve HTTP
    let state = Arc::new(AppState::new(pool.pool().clone()));
    let server_config = ServerConfig {
        host: config.host,
        port: config.port,
    };
    start_server(&server_config, state).await?;

    Ok(())
}
