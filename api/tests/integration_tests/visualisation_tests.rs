//! Integration tests for dashboard aggregations.
//!
//! Tests cover:
//! - Severity counts keyed by display level
//! - Dense daily histogram in chronological order
//! - 3-hour error histogram anchored at midnight
//! - Empty tenants

use axum::http::StatusCode;
use serde_json::json;
use shared::models::LogRecord;

use super::common::{at, get, get_text, seeded_app, test_app};

#[tokio::test]
async fn test_severity_counts() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/visualisationLogs?uniqueId=shop-api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({ "info": 2, "success": 1, "warning": 1, "error": 2 })
    );
}

#[tokio::test]
async fn test_daily_histogram() {
    let (app, _state, _backend) = seeded_app();

    let (status, body) =
        get_text(app, "/api/visualisationLogsForLineGraph?uniqueId=shop-api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"01-01-2024":3,"02-01-2024":2,"03-01-2024":1}"#);
}

#[tokio::test]
async fn test_daily_histogram_fills_gaps() {
    let (app, _state, backend) = test_app();
    backend
        .insert(
            "sparse-app",
            vec![
                LogRecord::new("Information", "a", at(1, 30, 9, 0)),
                LogRecord::new("Information", "b", at(2, 2, 9, 0)),
            ],
        )
        .unwrap();

    let (status, body) =
        get_text(app, "/api/visualisationLogsForLineGraph?uniqueId=sparse-app").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"30-01-2024":1,"31-01-2024":0,"01-02-2024":0,"02-02-2024":1}"#
    );
}

#[tokio::test]
async fn test_error_histogram() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) =
        get(app, "/api/visualisationLogsForLineGraphError?uniqueId=shop-api").await;
    assert_eq!(status, StatusCode::OK);

    let buckets = response.as_object().unwrap();
    // Three full days of 3-hour buckets.
    assert_eq!(buckets.len(), 24);
    assert_eq!(buckets["02-01-2024 00:00 - 02-01-2024 03:00"], 1);
    assert_eq!(buckets["03-01-2024 21:00 - 04-01-2024 00:00"], 1);

    let total: u64 = buckets.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_empty_tenant_yields_empty_objects() {
    let (app, _state, backend) = test_app();
    backend.create_index("new-app").unwrap();

    for uri in [
        "/api/visualisationLogs?uniqueId=new-app",
        "/api/visualisationLogsForLineGraph?uniqueId=new-app",
        "/api/visualisationLogsForLineGraphError?uniqueId=new-app",
    ] {
        let (status, body) = get_text(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, "{}", "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_tenant() {
    let (app, _state, _backend) = test_app();

    let (status, response) = get(app, "/api/visualisationLogs?uniqueId=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "index_not_found");
}
