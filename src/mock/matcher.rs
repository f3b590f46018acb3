//! Mock matching.
//!
//! # Responsibilities
//! - Canonicalize request bodies and mock post-data into JSON strings
//! - Decide whether a single mock matches a request
//! - Subset comparison with `""` wildcards for partial mocks
//!
//! # Design Decisions
//! - Canonical form is `serde_json` output of a parsed value, so object key
//!   order and whitespace never affect equality
//! - Normalization failures degrade to "no match" instead of failing the
//!   request
//! - A mock declaring post-data still matches a request without a body

use serde_json::Value;

use crate::mock::definition::MockDefinition;

/// A body that could not be read as JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot normalize {source_kind} body as JSON: {reason}")]
pub struct MockNormalizationError {
    pub source_kind: &'static str,
    pub reason: String,
}

/// The request body as seen by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingBody {
    Absent,
    Json { canonical: String, value: Value },
    Invalid,
}

impl IncomingBody {
    /// Normalize raw request bytes. Empty bodies count as absent.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return IncomingBody::Absent;
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => IncomingBody::Json {
                canonical: value.to_string(),
                value,
            },
            Err(err) => {
                let err = MockNormalizationError {
                    source_kind: "request",
                    reason: err.to_string(),
                };
                tracing::warn!(error = %err, "Request body is not JSON, mocks with post-data will not match");
                IncomingBody::Invalid
            }
        }
    }
}

/// Canonicalize mock post-data: strings are parsed, values used as is.
pub fn normalize_postdata(postdata: &Value) -> Result<(String, Value), MockNormalizationError> {
    let value = match postdata {
        Value::String(text) => serde_json::from_str::<Value>(text).map_err(|err| MockNormalizationError {
            source_kind: "mock",
            reason: err.to_string(),
        })?,
        other => other.clone(),
    };
    Ok((value.to_string(), value))
}

/// Every key in `expected` exists in `actual` with an equal value, or with
/// any value when `expected` holds `""` there. Objects recurse.
pub fn is_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, want)| {
            match actual.get(key) {
                None => false,
                Some(_) if want.as_str() == Some("") => true,
                Some(got) => is_subset(want, got),
            }
        }),
        _ => expected == actual,
    }
}

fn body_matches(mock: &MockDefinition, body: &IncomingBody) -> bool {
    let Some(postdata) = &mock.postdata else {
        return true;
    };

    let (canonical, value) = match body {
        IncomingBody::Absent => return true,
        IncomingBody::Invalid => return false,
        IncomingBody::Json { canonical, value } => (canonical, value),
    };

    let (expected_canonical, expected) = match normalize_postdata(postdata) {
        Ok(normalized) => normalized,
        Err(err) => {
            tracing::warn!(url = %mock.url, error = %err, "Skipping mock with unreadable post-data");
            return false;
        }
    };

    if &expected_canonical == canonical {
        return true;
    }

    mock.match_empty && is_subset(&expected, value)
}

/// Whether `mock` answers a request for `method url` with `body`.
pub fn matches(mock: &MockDefinition, url: &str, method: &str, body: &IncomingBody) -> bool {
    mock.url == url && mock.method.eq_ignore_ascii_case(method) && body_matches(mock, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> IncomingBody {
        IncomingBody::from_bytes(value.to_string().as_bytes())
    }

    #[test]
    fn test_url_and_method() {
        let mock = MockDefinition::new("post", "/a");
        assert!(matches(&mock, "/a", "POST", &IncomingBody::Absent));
        assert!(!matches(&mock, "/a", "GET", &IncomingBody::Absent));
        assert!(!matches(&mock, "/a?x=1", "POST", &IncomingBody::Absent));
        assert!(!matches(&mock, "/b", "POST", &IncomingBody::Absent));
    }

    #[test]
    fn test_exact_body_ignores_key_order() {
        let mock = MockDefinition::new("POST", "/a").with_postdata(json!({"x": 1, "y": [1, 2]}));
        let incoming = IncomingBody::from_bytes(br#"{ "y": [1,2], "x": 1 }"#);
        assert!(matches(&mock, "/a", "POST", &incoming));
        assert!(!matches(&mock, "/a", "POST", &body(json!({"x": 2, "y": [1, 2]}))));
    }

    #[test]
    fn test_string_postdata_is_parsed() {
        let mock = MockDefinition::new("POST", "/a").with_postdata(r#"{"x":1}"#);
        assert!(matches(&mock, "/a", "POST", &body(json!({"x": 1}))));
    }

    #[test]
    fn test_unparseable_postdata_never_matches_a_body() {
        let mock = MockDefinition::new("POST", "/a").with_postdata("not json");
        assert!(!matches(&mock, "/a", "POST", &body(json!({"x": 1}))));
    }

    #[test]
    fn test_postdata_against_missing_body_still_matches() {
        // Post-data mocks also answer body-less requests; flagged for product review.
        let mock = MockDefinition::new("POST", "/a").with_postdata(json!({"x": 1}));
        assert!(matches(&mock, "/a", "POST", &IncomingBody::Absent));
        assert!(matches(&mock, "/a", "POST", &IncomingBody::from_bytes(b"")));
    }

    #[test]
    fn test_invalid_request_body() {
        let incoming = IncomingBody::from_bytes(b"{broken");
        assert_eq!(incoming, IncomingBody::Invalid);

        let with_postdata = MockDefinition::new("POST", "/a").with_postdata(json!({"x": 1}));
        let without = MockDefinition::new("POST", "/a");
        assert!(!matches(&with_postdata, "/a", "POST", &incoming));
        assert!(matches(&without, "/a", "POST", &incoming));
    }

    #[test]
    fn test_partial_match_with_wildcard() {
        let mock = MockDefinition::new("POST", "/a")
            .with_postdata(json!({"x": 1, "y": ""}))
            .partial();
        assert!(matches(&mock, "/a", "POST", &body(json!({"x": 1, "y": 99, "z": 5}))));
        assert!(!matches(&mock, "/a", "POST", &body(json!({"x": 2, "y": 99}))));
        assert!(!matches(&mock, "/a", "POST", &body(json!({"x": 1}))));
    }

    #[test]
    fn test_partial_requires_flag() {
        let mock = MockDefinition::new("POST", "/a").with_postdata(json!({"x": 1, "y": ""}));
        assert!(!matches(&mock, "/a", "POST", &body(json!({"x": 1, "y": 99}))));
    }

    #[test]
    fn test_nested_subset() {
        let expected = json!({"user": {"id": 7, "token": ""}, "tags": ["a"]});
        assert!(is_subset(&expected, &json!({"user": {"id": 7, "token": "t", "extra": 1}, "tags": ["a"]})));
        assert!(!is_subset(&expected, &json!({"user": {"id": 8, "token": "t"}, "tags": ["a"]})));
        assert!(!is_subset(&expected, &json!({"user": {"id": 7, "token": "t"}, "tags": ["a", "b"]})));
        assert!(!is_subset(&expected, &json!("scalar")));
    }
}
