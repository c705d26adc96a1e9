//! Integration tests for health check and general API functionality.
//!
//! Tests cover:
//! - Health check endpoint
//! - Unknown routes

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state, _backend) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["service"], "logscope-api");
}

#[tokio::test]
async fn test_health_reports_shutdown() {
    let (app, state, _backend) = test_app();
    state.shutdown_token().cancel();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response["status"], "shutting_down");
}

#[tokio::test]
async fn test_routes_without_api_prefix_are_not_found() {
    let (app, _state, _backend) = test_app();

    let (status, _) = get(app, "/checkUniqueId?uniqueId=shop-api").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
