//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::alerts::{AlertDirectory, InMemoryAlertDirectory};
use shared::export::{CsvFileExporter, DocumentExporter};
use shared::search::{DrainOptions, InMemorySearchBackend, SearchBackend};
use shared::LogService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Application state shared across all request handlers.
///
/// Every field is a cheap handle; cloning the state shares the same backend,
/// directory, exporter and shutdown token.
#[derive(Clone)]
pub struct AppState {
    logs: Arc<LogService>,
    alerts: Arc<dyn AlertDirectory>,
    exporter: Arc<dyn DocumentExporter>,
    shutdown: CancellationToken,
}

impl AppState {
    /// Creates a new application state from its collaborators.
    pub fn new(
        logs: LogService,
        alerts: Arc<dyn AlertDirectory>,
        exporter: Arc<dyn DocumentExporter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            logs: Arc::new(logs),
            alerts,
            exporter,
            shutdown,
        }
    }

    /// Creates a state over an in-memory search backend, an empty alert
    /// directory and a CSV exporter writing to the system temp directory.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_backend(backend: InMemorySearchBackend) -> Self {
        let backend: Arc<dyn SearchBackend> = Arc::new(backend);
        Self::new(
            LogService::new(backend, DrainOptions::default()),
            Arc::new(InMemoryAlertDirectory::new()),
            Arc::new(CsvFileExporter::new(
                std::env::temp_dir().join("logscope-exports"),
            )),
            CancellationToken::new(),
        )
    }

    /// Replaces the alert directory.
    #[must_use]
    pub fn with_alerts(mut self, alerts: Arc<dyn AlertDirectory>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Replaces the document exporter.
    #[must_use]
    pub fn with_exporter(mut self, exporter: Arc<dyn DocumentExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    /// Returns the log service.
    #[must_use]
    pub fn logs(&self) -> &LogService {
        self.logs.as_ref()
    }

    /// Returns the alert directory.
    #[must_use]
    pub fn alerts(&self) -> &dyn AlertDirectory {
        self.alerts.as_ref()
    }

    /// Returns the document exporter.
    #[must_use]
    pub fn exporter(&self) -> &dyn DocumentExporter {
        self.exporter.as_ref()
    }

    /// Returns a token for one request. It is cancelled when the server shuts
    /// down.
    #[must_use]
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Returns the process-wide shutdown token.
    #[must_use]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_backend(InMemorySearchBackend::new())
    }
}
