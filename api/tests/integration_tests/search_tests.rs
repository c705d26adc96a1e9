//! Integration tests for tenant lookup and filtered search.
//!
//! Tests cover:
//! - Existence check
//! - Term, level and date filters and their combination
//! - Ordering and multi-page draining
//! - Error statuses for bad input and missing tenants

use axum::http::StatusCode;
use chrono::Duration;
use shared::models::LogRecord;

use super::common::{at, get, seeded_app, test_app, TENANT};

fn messages(response: &serde_json::Value) -> Vec<&str> {
    response
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["message"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_check_unique_id() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app.clone(), "/api/checkUniqueId?uniqueId=shop-api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["exists"], true);

    let (status, response) = get(app, "/api/checkUniqueId?uniqueId=other-app").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["exists"], false);
}

#[tokio::test]
async fn test_search_without_filters_returns_everything_in_order() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/searchTest?uniqueId=shop-api&type=All").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        messages(&response),
        [
            "Application started",
            "Cache warmed",
            "Slow query detected",
            "Payment gateway timeout",
            "Order placed",
            "Disk full",
        ]
    );
}

#[tokio::test]
async fn test_search_response_shape() {
    let (app, _state, _backend) = seeded_app();

    let (_, response) = get(app, "/api/searchTest?uniqueId=shop-api&searchTerm=gateway").await;
    let record = &response[0];

    assert_eq!(record["level"], "error");
    assert_eq!(record["rawLevel"], "Error");
    assert_eq!(record["timeStamp"], "2024-01-02T01:30:00+00:00");
    assert_eq!(record["callingFile"], "PaymentService.cs");
    assert_eq!(record["callingMethod"], "Charge");
}

#[tokio::test]
async fn test_search_by_level_is_case_insensitive() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/searchTest?uniqueId=shop-api&type=information").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&response), ["Application started", "Order placed"]);
}

#[tokio::test]
async fn test_search_term_matches_calling_method() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/searchTest?uniqueId=shop-api&searchTerm=main").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&response), ["Application started"]);
}

#[tokio::test]
async fn test_search_with_encoded_term_and_range() {
    let (app, _state, _backend) = seeded_app();

    let uri = format!(
        "/api/searchTest?uniqueId={TENANT}&searchTerm={}&fromDate={}&toDate={}",
        urlencoding::encode("Order placed"),
        urlencoding::encode("2024-01-02 00:00:00"),
        urlencoding::encode("2024-01-02T23:59:59Z"),
    );

    let (status, response) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&response), ["Order placed"]);
}

#[tokio::test]
async fn test_search_combined_filters() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(
        app,
        "/api/searchTest?uniqueId=shop-api&searchTerm=timeout&type=Error&fromDate=2024-01-01&toDate=2024-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&response), ["Payment gateway timeout"]);
}

#[tokio::test]
async fn test_search_with_no_matches_is_empty_not_error() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/searchTest?uniqueId=shop-api&searchTerm=nothing-like-this").await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_drains_every_page() {
    let (app, _state, backend) = test_app();
    let records: Vec<LogRecord> = (0..2_500)
        .rev()
        .map(|i| {
            LogRecord::new(
                "Information",
                format!("event {i}"),
                at(1, 1, 0, 0) + Duration::seconds(i),
            )
        })
        .collect();
    backend.insert("busy-app", records).unwrap();

    let (status, response) = get(app, "/api/searchTest?uniqueId=busy-app").await;
    assert_eq!(status, StatusCode::OK);

    let all = messages(&response);
    assert_eq!(all.len(), 2_500);
    assert_eq!(all[0], "event 0");
    assert_eq!(all[2_499], "event 2499");
    assert_eq!(backend.open_cursors().unwrap(), 0);
}

#[tokio::test]
async fn test_search_rejects_inverted_range() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(
        app,
        "/api/searchTest?uniqueId=shop-api&fromDate=2024-02-01&toDate=2024-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_filter_value");
}

#[tokio::test]
async fn test_search_unknown_tenant() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/searchTest?uniqueId=other-app").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "index_not_found");
}

#[tokio::test]
async fn test_search_rejects_upper_case_unique_id() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(app, "/api/searchTest?uniqueId=Shop-Api").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_unique_id");
}
