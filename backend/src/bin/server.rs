//! Rapport HTTP Server Binary
//!
//! This is the main entry point for the Rapport REST API server.
//! It loads configuration, builds the repository, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin rapport-server
//!
//! # Run against a SQLite file
//! REPOSITORY_TYPE=sqlite SQLITE_PATH=rapport.db \
//!   cargo run --bin rapport-server --features sqlite-repo
//! ```
//!
//! # Environment Variables
//!
//! - `RAPPORT_CONFIG`: Path to a `rapport.toml` (default: searched in standard locations)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `local` or `sqlite`
//! - `SQLITE_PATH`: SQLite database file (sqlite-repo feature)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rapport::config::AppConfig;
use rapport::db::RepositoryFactory;
use rapport::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Rapport HTTP Server");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let repository =
        RepositoryFactory::from_config(&config).context("Failed to initialize repository")?;
    info!(
        "Repository initialized successfully ({})",
        config.repository.repo_type
    );

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .context("Invalid bind address")?;

    // Create application state
    let state = AppState::with_config(repository, config);

    // Create router with all endpoints
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
