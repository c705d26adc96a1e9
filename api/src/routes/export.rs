//! Document export endpoint.
//!
//! Runs the same search as `/api/searchTest` and hands the records to the
//! configured exporter.

use super::params::{validated, SearchParams};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use shared::export::{DocType, ExportReceipt};

/// Creates the export routes with application state.
pub fn export_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/doc", get(export_document))
        .with_state(state)
}

/// Handler for document export.
async fn export_document(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<ExportReceipt>, ApiError> {
    let params = validated(params)?;
    let doc_type: DocType = params
        .doc_type
        .as_deref()
        .ok_or_else(|| ApiError::validation("docType is required"))?
        .parse()?;
    let filter = params.filter()?;

    let records = state
        .logs()
        .search(&params.unique_id, &filter, &state.request_token())
        .await?;

    let receipt = state
        .exporter()
        .export(&params.unique_id, doc_type, &records)
        .await?;

    tracing::info!(
        index = %params.unique_id,
        doc_type = %doc_type,
        records = receipt.records,
        "Document exported"
    );

    Ok(Json(receipt))
}
