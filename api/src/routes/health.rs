//! Liveness endpoint.
//!
//! Reports `ok` while the server accepts work and `shutting_down` with a 503
//! once graceful shutdown has begun, so load balancers stop routing to it.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `shutting_down`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Creates the health routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = if state.shutdown_token().is_cancelled() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting_down")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            service: "logscope-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
