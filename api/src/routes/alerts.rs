//! Alert recipient endpoint.

use super::params::{validated, UniqueIdParams};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use shared::models::AlertRecipient;
use shared::search::validate_index_name;

/// Creates the alert routes with application state.
pub fn alerts_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .with_state(state)
}

/// Handler listing the alert e-mails registered for a tenant.
///
/// An unknown tenant yields an empty list.
async fn list_alerts(
    State(state): State<AppState>,
    params: Result<Query<UniqueIdParams>, QueryRejection>,
) -> Result<Json<Vec<AlertRecipient>>, ApiError> {
    let params = validated(params)?;
    validate_index_name(&params.unique_id)?;

    let recipients = state.alerts().recipients(&params.unique_id).await?;

    Ok(Json(recipients))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use shared::alerts::InMemoryAlertDirectory;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_router() -> Router {
        let directory = InMemoryAlertDirectory::from_json_str(
            r#"[{
                "registrationId": "shop-api",
                "emails": [{
                    "id": "a1",
                    "from": "alerts@example.com",
                    "to": "oncall@example.com",
                    "subject": "Errors",
                    "body": "See dashboard"
                }]
            }]"#,
        )
        .unwrap();
        alerts_routes(AppState::default().with_alerts(Arc::new(directory)))
    }

    async fn get_alerts(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = create_test_router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_list_alerts() {
        let (status, body) = get_alerts("/api/alerts?uniqueId=shop-api").await;

        assert_eq!(status, StatusCode::OK);
        let recipients: Vec<AlertRecipient> = serde_json::from_value(body).unwrap();
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].to, "oncall@example.com");
    }

    #[tokio::test]
    async fn test_unknown_tenant_yields_empty_list() {
        let (status, body) = get_alerts("/api/alerts?uniqueId=nobody").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_invalid_unique_id() {
        let (status, body) = get_alerts("/api/alerts?uniqueId=..").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_unique_id");
    }
}
