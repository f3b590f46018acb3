//! The shared terminal error path.
//!
//! # Responsibilities
//! - Carry a status, message and optional application code from handlers
//! - Render every failure as one JSON envelope
//! - Log once, at the severity the status implies
//!
//! # Design Decisions
//! - 4xx messages are shown to the client, 5xx messages are replaced with
//!   `Internal Server Error` unless explicitly exposed
//! - Unrouted requests use a fixed 404 envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message used for hidden server errors.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Message used for unrouted requests.
pub const NOT_FOUND_MESSAGE: &str = "404 Not Found";

/// A failure raised by a controller, one of its hooks, or result coercion.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    pub status: StatusCode,
    /// Application-level error code, rendered as `code`.
    pub code: Option<i64>,
    /// Short error label, rendered as `error`.
    pub label: Option<String>,
    pub message: String,
    /// Show `message` to the client even for server errors.
    pub expose: bool,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            label: None,
            message: message.into(),
            expose: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Render the message verbatim regardless of status.
    pub fn exposed(mut self) -> Self {
        self.expose = true;
        self
    }

    fn public_message(&self) -> String {
        if self.expose || self.status.is_client_error() {
            self.message.clone()
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::bad_request(format!("Invalid JSON body: {}", err))
    }
}

/// Everything that reaches the terminal error handler.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
}

/// JSON body written for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl FrameworkError {
    pub fn status(&self) -> StatusCode {
        match self {
            FrameworkError::Handler(err) => err.status,
            FrameworkError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error").to_string();
        match self {
            FrameworkError::Handler(err) => ErrorEnvelope {
                status: status.as_u16(),
                error: err.label.clone().unwrap_or(reason),
                message: err.public_message(),
                code: err.code,
            },
            FrameworkError::NotFound => ErrorEnvelope {
                status: status.as_u16(),
                error: reason,
                message: NOT_FOUND_MESSAGE.to_string(),
                code: None,
            },
        }
    }
}

impl IntoResponse for FrameworkError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(self.envelope())).into_response()
    }
}

/// Fallback for requests no route matched.
pub async fn not_found() -> FrameworkError {
    FrameworkError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = FrameworkError::from(HandlerError::bad_request("missing name").with_code(42));
        let envelope = err.envelope();
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.error, "Bad Request");
        assert_eq!(envelope.message, "missing name");
        assert_eq!(envelope.code, Some(42));
    }

    #[test]
    fn test_server_errors_hide_their_message() {
        let err = FrameworkError::from(HandlerError::internal("db password rejected"));
        assert_eq!(err.envelope().message, INTERNAL_ERROR_MESSAGE);

        let err = FrameworkError::from(
            HandlerError::new(StatusCode::SERVICE_UNAVAILABLE, "maintenance window").exposed(),
        );
        let envelope = err.envelope();
        assert_eq!(envelope.status, 503);
        assert_eq!(envelope.message, "maintenance window");
    }

    #[test]
    fn test_not_found_envelope() {
        let envelope = FrameworkError::NotFound.envelope();
        assert_eq!(envelope.status, 404);
        assert_eq!(envelope.message, NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_envelope_serialization_skips_missing_code() {
        let json = serde_json::to_value(FrameworkError::NotFound.envelope()).unwrap();
        assert!(json.get("code").is_none());
        assert_eq!(json["status"], 404);
    }
}
