//! HTTP error mapping.
//!
//! Every handler failure passes through [`ApiError`], which picks the status
//! code and writes a `{ "error", "message" }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::alerts::AlertError;
use shared::export::ExportError;
use shared::search::SearchError;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// An error returned from a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and kind.
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    /// A 400 response for a request that failed validation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_failed", message)
    }

    /// The response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The error kind written to the body.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        let (status, kind) = match &e {
            SearchError::InvalidFilterValue { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_filter_value")
            }
            SearchError::InvalidIndexName(_) => (StatusCode::BAD_REQUEST, "invalid_unique_id"),
            SearchError::IndexNotFound(_) => (StatusCode::NOT_FOUND, "index_not_found"),
            SearchError::CursorExpired => (StatusCode::CONFLICT, "cursor_expired"),
            SearchError::Backend(_) => (StatusCode::BAD_GATEWAY, "backend_error"),
            SearchError::BackendUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable")
            }
            SearchError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "cancelled"),
            SearchError::DeadlineExceeded => (StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded"),
        };
        Self::new(status, kind, e.to_string())
    }
}

impl From<AlertError> for ApiError {
    fn from(e: AlertError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "alerts_error", e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        let (status, kind) = match &e {
            ExportError::Unsupported(_) => (StatusCode::NOT_IMPLEMENTED, "unsupported_doc_type"),
            ExportError::UnknownDocType(_) => (StatusCode::BAD_REQUEST, "unknown_doc_type"),
            ExportError::Csv(_) | ExportError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "export_failed")
            }
        };
        Self::new(status, kind, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = self.kind, message = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = self.kind, message = %self.message, "Request rejected");
        }

        (
            self.status,
            Json(ErrorBody {
                error: self.kind.to_string(),
                message: self.message,
            }),
        )
            .into_response()
    }
}
