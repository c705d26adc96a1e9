//! Log lookup endpoints.
//!
//! Provides the tenant existence check and the filtered log search.

use super::params::{validated, SearchParams, UniqueIdParams};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::LogView;

/// Response of the existence check.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExistsResponse {
    /// True if the tenant's index exists.
    pub exists: bool,
}

/// Creates the log lookup routes with application state.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/checkUniqueId", get(check_unique_id))
        .route("/api/searchTest", get(search_logs))
        .with_state(state)
}

/// Handler for the tenant existence check.
async fn check_unique_id(
    State(state): State<AppState>,
    params: Result<Query<UniqueIdParams>, QueryRejection>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let params = validated(params)?;
    let exists = state.logs().index_exists(&params.unique_id).await?;

    Ok(Json(ExistsResponse { exists }))
}

/// Handler for the filtered search.
///
/// Returns every matching record, oldest first.
async fn search_logs(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<LogView>>, ApiError> {
    let params = validated(params)?;
    let filter = params.filter()?;

    let records = state
        .logs()
        .search(&params.unique_id, &filter, &state.request_token())
        .await?;

    tracing::debug!(
        index = %params.unique_id,
        count = records.len(),
        "Search completed"
    );

    Ok(Json(records.into_iter().map(LogView::from).collect()))
}
