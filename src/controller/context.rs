//! Per-request context handed to controllers.
//!
//! Wraps the buffered request together with the response state the
//! dispatcher inspects before every write: the status and extra headers a
//! handler asked for, and whether a response has already been sent.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::http::error::HandlerError;

/// Request header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Bytes,
    started_at: Instant,
    status: StatusCode,
    response_headers: HeaderMap,
    sent: Mutex<Option<Response>>,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = axum::extract::Query::<HashMap<String, String>>::try_from_uri(&uri)
            .map(|q| q.0)
            .unwrap_or_default();

        Self {
            method,
            uri,
            headers,
            params: HashMap::new(),
            query,
            body,
            started_at: Instant::now(),
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            sent: Mutex::new(None),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub(crate) fn with_start(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// Path parameter captured by a `:name` segment.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> Result<&str, HandlerError> {
        std::str::from_utf8(&self.body)
            .map_err(|_| HandlerError::bad_request("Request body is not valid UTF-8"))
    }

    /// Deserialize the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Status used when the handler result is written.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Add a header to the response written from the handler result.
    pub fn insert_header(&mut self, name: &str, value: &str) -> Result<(), HandlerError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HandlerError::internal(format!("Invalid header name `{}`", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HandlerError::internal(format!("Invalid value for header `{}`", name)))?;
        self.response_headers.insert(name, value);
        Ok(())
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Write a response now. Returns `false`, leaving the earlier response in
    /// place, when one was already sent.
    pub fn send(&self, response: impl IntoResponse) -> bool {
        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        if sent.is_some() {
            tracing::warn!(path = %self.uri.path(), "Response already sent, ignoring write");
            return false;
        }
        *sent = Some(response.into_response());
        true
    }

    pub fn headers_sent(&self) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub(crate) fn take_sent(&self) -> Option<Response> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(uri: &str, body: &str) -> RequestContext {
        RequestContext::new(
            Method::POST,
            uri.parse().unwrap(),
            HeaderMap::new(),
            Bytes::from(body.to_string()),
        )
    }

    #[test]
    fn test_query_and_body() {
        let ctx = ctx("/users?page=2&sort=name", r#"{"name":"ada"}"#);
        assert_eq!(ctx.query("page"), Some("2"));
        assert_eq!(ctx.path(), "/users");

        #[derive(serde::Deserialize)]
        struct Body {
            name: String,
        }
        assert_eq!(ctx.json::<Body>().unwrap().name, "ada");
    }

    #[test]
    fn test_invalid_json_is_bad_request() {
        let err = ctx("/", "{oops").json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_send_only_once() {
        let ctx = ctx("/", "");
        assert!(!ctx.headers_sent());
        assert!(ctx.send("first"));
        assert!(ctx.headers_sent());
        assert!(!ctx.send("second"));
        assert!(ctx.take_sent().is_some());
    }
}
