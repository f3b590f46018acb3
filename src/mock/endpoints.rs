//! Mock management endpoints, mounted in e2e testing mode only.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde_json::Value;

use crate::http::error::{FrameworkError, HandlerError};
use crate::mock::definition::MockDefinition;
use crate::mock::store::MockStore;

/// Path serving both registration and inspection.
pub const MOCKS_PATH: &str = "/mocks/api";

pub fn mock_router(store: Arc<MockStore>) -> Router {
    Router::new()
        .route(MOCKS_PATH, get(dump_mocks).post(register_mock))
        .with_state(store)
}

/// Register a mock. Anything that parses as JSON gets a 200.
pub async fn register_mock(
    State(store): State<Arc<MockStore>>,
    body: Bytes,
) -> Result<StatusCode, FrameworkError> {
    let value: Value = serde_json::from_slice(&body).map_err(HandlerError::from)?;

    match serde_json::from_value::<MockDefinition>(value) {
        Ok(mock) => store.register(mock),
        Err(err) => tracing::warn!(error = %err, "Ignoring malformed mock definition"),
    }

    Ok(StatusCode::OK)
}

/// Log the registry; the response body stays empty.
pub async fn dump_mocks(State(store): State<Arc<MockStore>>) -> StatusCode {
    let mocks = store.snapshot();
    match serde_json::to_string(&mocks) {
        Ok(json) => tracing::info!(count = mocks.len(), mocks = %json, "Registered mocks"),
        Err(err) => tracing::warn!(error = %err, "Cannot serialize mock registry"),
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post(app: Router, body: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::post(MOCKS_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_register_returns_empty_ok() {
        let store = Arc::new(MockStore::new());
        let (status, body) = post(mock_router(store.clone()), r#"{"url":"/a","persist":false}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "");
        assert_eq!(store.len(), 1);
        assert!(!store.snapshot()[0].persist);
    }

    #[tokio::test]
    async fn test_malformed_definition_still_ok() {
        let store = Arc::new(MockStore::new());
        let (status, _) = post(mock_router(store.clone()), r#"{"url":"/a","statusCode":"teapot"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_body_is_rejected() {
        let store = Arc::new(MockStore::new());
        let (status, body) = post(mock_router(store), "{nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("\"status\":400"));
    }

    #[tokio::test]
    async fn test_dump_is_empty_ok() {
        let store = Arc::new(MockStore::new());
        store.register(MockDefinition::new("GET", "/a"));
        let response = mock_router(store)
            .oneshot(Request::get(MOCKS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
