//! Integration tests for alert recipient lookup.

use api::create_router;
use axum::http::StatusCode;
use shared::alerts::InMemoryAlertDirectory;
use std::io::Write;
use std::sync::Arc;

use super::common::{get, test_app};

const REGISTRATIONS: &str = r#"[
    {
        "registrationId": "shop-api",
        "emails": [
            { "id": "1", "from": "alerts@shop.example", "to": "dev@shop.example", "subject": "Errors", "body": "" },
            { "id": "2", "from": "alerts@shop.example", "to": "ops@shop.example", "subject": "Errors", "body": "" }
        ]
    }
]"#;

#[tokio::test]
async fn test_alerts_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(REGISTRATIONS.as_bytes()).unwrap();
    let directory = InMemoryAlertDirectory::from_json_file(file.path()).unwrap();

    let (_, state, _backend) = test_app();
    let app = create_router(state.with_alerts(Arc::new(directory)));

    let (status, response) = get(app.clone(), "/api/alerts?uniqueId=shop-api").await;
    assert_eq!(status, StatusCode::OK);

    let recipients = response.as_array().unwrap();
    assert_eq!(recipients.len(), 2);
    assert_eq!(recipients[0]["to"], "dev@shop.example");
    assert_eq!(recipients[1]["from"], "alerts@shop.example");

    let (status, response) = get(app, "/api/alerts?uniqueId=other-app").await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_alerts_require_unique_id() {
    let (app, _state, _backend) = test_app();

    let (status, response) = get(app, "/api/alerts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "validation_failed");
}
