//! Mock definitions as registered over the wire.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A canned response served in place of the real controller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDefinition {
    /// Path and query string, compared verbatim.
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_method")]
    pub method: String,

    #[serde(default = "default_status", deserialize_with = "lenient_status")]
    pub status_code: u16,

    #[serde(default)]
    pub response_headers: BTreeMap<String, String>,

    /// A string is written raw, anything else as JSON.
    #[serde(default = "default_response")]
    pub response: Value,

    /// Expected request body, as a JSON string or structured value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postdata: Option<Value>,

    /// Fall back to subset matching when the body is not an exact match.
    #[serde(default, deserialize_with = "truthy")]
    pub match_empty: bool,

    /// Keep the mock after it matched once. A missing field keeps it; a
    /// present one is read for truthiness, so `null`, `0` and `""` make
    /// the mock one-shot.
    #[serde(default = "default_persist", deserialize_with = "truthy")]
    pub persist: bool,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_status() -> u16 {
    200
}

fn default_response() -> Value {
    Value::String(String::new())
}

fn default_persist() -> bool {
    true
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

/// Accepts `201` and `"201"`; `null` falls back to the default.
fn lenient_status<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    let status = match &value {
        Value::Null => Some(default_status()),
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    status.ok_or_else(|| D::Error::custom(format!("invalid statusCode {}", value)))
}

impl MockDefinition {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            status_code: default_status(),
            response_headers: BTreeMap::new(),
            response: default_response(),
            postdata: None,
            match_empty: false,
            persist: default_persist(),
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_response(mut self, response: impl Into<Value>) -> Self {
        self.response = response.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.response_headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_postdata(mut self, postdata: impl Into<Value>) -> Self {
        self.postdata = Some(postdata.into());
        self
    }

    pub fn partial(mut self) -> Self {
        self.match_empty = true;
        self
    }

    pub fn once(mut self) -> Self {
        self.persist = false;
        self
    }

    /// The literal response for a match.
    pub fn to_response(&self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or_else(|_| {
            tracing::warn!(status = self.status_code, url = %self.url, "Mock has an invalid status code");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut response = match &self.response {
            Value::String(text) => Response::new(Body::from(text.clone())),
            Value::Null => Response::new(Body::empty()),
            structured => axum::Json(structured.clone()).into_response(),
        };
        *response.status_mut() = status;

        for (name, value) in &self.response_headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, url = %self.url, "Skipping invalid mock header"),
            }
        }

        response
    }
}
