//! Logscope API Server
//!
//! This crate provides the HTTP server for Logscope, a log retrieval and
//! visualisation API over a cursor-paginated search index.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - Tenant existence checks and filtered log search
//! - Severity counts and daily / 3-hour error histograms for dashboards
//! - Alert recipient lookup and CSV export of search results
//!
//! Each request drains the search backend through the shared `LogService`
//! under a per-request deadline and a cancellation token tied to server
//! shutdown.
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod config;
pub mod error;
mod routes;
pub mod state;

pub use config::{Config, LogFormat};
pub use error::{ApiError, ErrorBody};
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use shared::alerts::{AlertDirectory, InMemoryAlertDirectory};
use shared::export::CsvFileExporter;
use shared::LogService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Runs the Logscope API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Logscope API server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The search backend URL or alerts file is unusable
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        search_url = %config.search_url,
        page_size = config.page_size,
        "Logscope API server starting"
    );

    let state = build_state(&config).await?;
    let shutdown = state.shutdown_token().clone();
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Ends in-flight drains with `Cancelled`.
            shutdown.cancel();
        })
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Builds the application state from configuration.
///
/// # Errors
///
/// Returns an error if the search backend cannot be set up or the alerts file
/// cannot be loaded.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let backend = backend::connect(config).await?;
    let logs = LogService::new(backend, config.drain_options());

    let alerts: Arc<dyn AlertDirectory> = match &config.alerts_file {
        Some(path) => {
            let directory = InMemoryAlertDirectory::from_json_file(path).with_context(|| {
                format!("Failed to load alert registrations from {}", path.display())
            })?;
            tracing::info!(
                path = %path.display(),
                tenants = directory.len()?,
                "Loaded alert registrations"
            );
            Arc::new(directory)
        }
        None => Arc::new(InMemoryAlertDirectory::new()),
    };

    let exporter = Arc::new(CsvFileExporter::new(config.export_dir.clone()));

    Ok(AppState::new(
        logs,
        alerts,
        exporter,
        CancellationToken::new(),
    ))
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::logs_routes(state.clone()))
        .merge(routes::visualisation_routes(state.clone()))
        .merge(routes::alerts_routes(state.clone()))
        .merge(routes::export_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
