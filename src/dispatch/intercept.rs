//! Mock interception layer.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::{FrameworkError, HandlerError};
use crate::mock::{IncomingBody, MockStore, MOCKS_PATH};
use crate::observability::metrics;

/// State for [`intercept_mocks`].
#[derive(Clone)]
pub struct InterceptState {
    pub store: Arc<MockStore>,
    pub body_limit: usize,
}

/// Answer from the mock store when a mock matches, otherwise pass the
/// request on with its body restored. The mock API itself is never mocked.
pub async fn intercept_mocks(
    State(state): State<InterceptState>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == MOCKS_PATH {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return FrameworkError::from(HandlerError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
            ))
            .into_response();
        }
    };

    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path())
        .to_string();
    let incoming = IncomingBody::from_bytes(&bytes);

    if let Some(mock) = state.store.take_match(&url, parts.method.as_str(), &incoming) {
        tracing::debug!(
            method = %parts.method,
            url = %url,
            status = mock.status_code,
            persist = mock.persist,
            "Served request from mock"
        );
        metrics::record_mock_hit(parts.method.as_str());
        return mock.to_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
