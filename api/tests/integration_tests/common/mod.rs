//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup over the in-memory search backend and HTTP request
//! helpers.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::LogRecord;
use shared::search::InMemorySearchBackend;

/// Tenant seeded by [`seeded_app`].
pub const TENANT: &str = "shop-api";

/// Creates a test router over an empty in-memory backend.
///
/// # Returns
///
/// A tuple containing the configured router, the app state and the backend so
/// tests can seed records.
pub fn test_app() -> (Router, AppState, InMemorySearchBackend) {
    let backend = InMemorySearchBackend::new();
    let state = AppState::with_in_memory_backend(backend.clone());
    let router = create_router(state.clone());
    (router, state, backend)
}

/// Creates a test router whose backend holds [`sample_records`] under [`TENANT`].
pub fn seeded_app() -> (Router, AppState, InMemorySearchBackend) {
    let (router, state, backend) = test_app();
    backend.insert(TENANT, sample_records()).unwrap();
    (router, state, backend)
}

/// Shorthand for a UTC timestamp in 2024.
pub fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, minute, 0)
        .unwrap()
}

/// Records spanning three days, deliberately stored out of order.
pub fn sample_records() -> Vec<LogRecord> {
    vec![
        LogRecord::new("Error", "Payment gateway timeout", at(1, 2, 1, 30))
            .with_origin("PaymentService.cs", "Charge"),
        LogRecord::new("Information", "Application started", at(1, 1, 8, 0))
            .with_origin("Program.cs", "Main"),
        LogRecord::new("Warning", "Slow query detected", at(1, 1, 12, 15)),
        LogRecord::new("Debug", "Cache warmed", at(1, 1, 8, 5)),
        LogRecord::new("Critical", "Disk full", at(1, 3, 23, 0)),
        LogRecord::new("Information", "Order placed", at(1, 2, 14, 45)),
    ]
}

/// Helper to make a GET request.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to GET from
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get_text(app, uri).await;
    let json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request and keep the raw body.
///
/// Used where key order in a JSON object matters.
pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}
