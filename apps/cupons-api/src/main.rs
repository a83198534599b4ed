//! # Cupons API Server
//!
//! Binary entry point: configuration, logging, database, HTTP listener.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cupons_api::{build_router, ApiConfig, AppState, TracingNotifier};
use cupons_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Cupons API server...");

    // Load configuration
    let config = ApiConfig::load().context("loading configuration")?;
    let addr = config.bind_addr()?;
    info!(
        addr = %addr,
        db_path = %config.database_path,
        cors = config.cors_allow_origin.is_some(),
        "Configuration loaded"
    );

    // Open database (migrations run on connect)
    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("opening database")?;
    let (total, applied) = db.migration_status().await?;
    info!(applied, total, "Database ready");

    let state = Arc::new(AppState::new(db, config, Arc::new(TracingNotifier)));
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
