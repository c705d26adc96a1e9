//! Integration tests for document export.

use api::create_router;
use axum::http::StatusCode;
use shared::export::{CsvFileExporter, CSV_HEADER};
use std::sync::Arc;

use super::common::{get, seeded_app};

#[tokio::test]
async fn test_csv_export_of_filtered_search() {
    let dir = tempfile::tempdir().unwrap();
    let (_, state, _backend) = seeded_app();
    let app = create_router(state.with_exporter(Arc::new(CsvFileExporter::new(dir.path()))));

    let (status, response) = get(
        app,
        "/api/doc?uniqueId=shop-api&type=Information&docType=csv",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["records"], 2);

    let location = response["location"].as_str().unwrap();
    let csv = std::fs::read_to_string(location).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        [
            CSV_HEADER,
            "2024-01-01T08:00:00+00:00,Information,Application started,Program.cs,Main",
            "2024-01-02T14:45:00+00:00,Information,Order placed,,",
        ]
    );
}

#[tokio::test]
async fn test_pdf_export_is_not_implemented() {
    let dir = tempfile::tempdir().unwrap();
    let (_, state, _backend) = seeded_app();
    let app = create_router(state.with_exporter(Arc::new(CsvFileExporter::new(dir.path()))));

    let (status, response) = get(app, "/api/doc?uniqueId=shop-api&docType=pdf").await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response["error"], "unsupported_doc_type");
    assert!(!dir.path().join("shop-api.pdf").exists());
}

#[tokio::test]
async fn test_export_with_bad_date_is_rejected() {
    let (app, _state, _backend) = seeded_app();

    let (status, response) = get(
        app,
        "/api/doc?uniqueId=shop-api&docType=csv&toDate=31-01-2024",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_filter_value");
}
