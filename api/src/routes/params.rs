//! Query-string parameters shared by the log endpoints.

use crate::error::ApiError;
use axum::extract::{rejection::QueryRejection, Query};
use serde::Deserialize;
use shared::search::{FilterSpec, SearchError};
use validator::Validate;

/// Parameters of endpoints that only take the tenant id.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UniqueIdParams {
    /// The tenant's unique id.
    #[serde(default)]
    #[validate(length(min = 1, message = "uniqueId is required"))]
    pub unique_id: String,
}

/// Parameters of the search and export endpoints.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// The tenant's unique id.
    #[serde(default)]
    #[validate(length(min = 1, message = "uniqueId is required"))]
    pub unique_id: String,

    /// Free-text term.
    pub search_term: Option<String>,

    /// Level selector; `All` or absent means no level filter.
    #[serde(rename = "type")]
    pub level_type: Option<String>,

    /// Inclusive lower bound on the timestamp.
    pub from_date: Option<String>,

    /// Inclusive upper bound on the timestamp.
    pub to_date: Option<String>,

    /// Requested document type (export only).
    pub doc_type: Option<String>,
}

impl SearchParams {
    /// Parses the optional filters.
    ///
    /// # Errors
    ///
    /// Returns an error if a date is malformed or the range is inverted.
    pub fn filter(&self) -> Result<FilterSpec, SearchError> {
        FilterSpec::parse(
            self.search_term.as_deref(),
            self.level_type.as_deref(),
            self.from_date.as_deref(),
            self.to_date.as_deref(),
        )
    }
}

/// Unwraps and validates query parameters.
pub fn validated<T: Validate>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    params
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(params)
}
