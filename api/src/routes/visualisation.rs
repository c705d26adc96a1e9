//! Visualisation endpoints.
//!
//! Severity counts and the two line-graph histograms, each computed over every
//! record of the tenant.

use super::params::{validated, UniqueIdParams};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use shared::analytics::{Histogram, SeverityCounts};

/// Creates the visualisation routes with application state.
pub fn visualisation_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/visualisationLogs", get(severity_counts))
        .route("/api/visualisationLogsForLineGraph", get(daily_histogram))
        .route(
            "/api/visualisationLogsForLineGraphError",
            get(error_histogram),
        )
        .with_state(state)
}

/// Handler for record counts per display level.
async fn severity_counts(
    State(state): State<AppState>,
    params: Result<Query<UniqueIdParams>, QueryRejection>,
) -> Result<Json<SeverityCounts>, ApiError> {
    let params = validated(params)?;
    let counts = state
        .logs()
        .severity_counts(&params.unique_id, &state.request_token())
        .await?;

    Ok(Json(counts))
}

/// Handler for the per-day histogram.
async fn daily_histogram(
    State(state): State<AppState>,
    params: Result<Query<UniqueIdParams>, QueryRejection>,
) -> Result<Json<Histogram>, ApiError> {
    let params = validated(params)?;
    let histogram = state
        .logs()
        .daily_histogram(&params.unique_id, &state.request_token())
        .await?;

    Ok(Json(histogram))
}

/// Handler for the 3-hour error histogram.
async fn error_histogram(
    State(state): State<AppState>,
    params: Result<Query<UniqueIdParams>, QueryRejection>,
) -> Result<Json<Histogram>, ApiError> {
    let params = validated(params)?;
    let histogram = state
        .logs()
        .error_histogram(&params.unique_id, &state.request_token())
        .await?;

    Ok(Json(histogram))
}
