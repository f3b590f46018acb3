//! Handler results.
//!
//! A handler either returns a value right away or a future that produces
//! one; the dispatcher awaits the latter before writing anything.

use std::fmt;
use std::future::Future;

use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::http::error::HandlerError;

/// A resolved handler value.
pub enum Reply {
    /// Structured data, written as `application/json`.
    Json(Value),
    /// Raw body.
    Text(String),
    /// Empty body.
    Empty,
    /// A fully built response, written as is.
    Response(Response),
}

impl Reply {
    /// Serialize any value; objects and arrays become JSON, scalars text.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        let value = serde_json::to_value(value)
            .map_err(|e| HandlerError::internal(format!("Failed to serialize reply: {}", e)))?;
        Ok(Reply::from(value))
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Reply::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Reply::Empty => f.write_str("Empty"),
            Reply::Response(res) => f.debug_tuple("Response").field(&res.status()).finish(),
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Reply::Empty,
            Value::String(text) => Reply::Text(text),
            Value::Bool(b) => Reply::Text(b.to_string()),
            Value::Number(n) => Reply::Text(n.to_string()),
            structured @ (Value::Object(_) | Value::Array(_)) => Reply::Json(structured),
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

impl From<Response> for Reply {
    fn from(res: Response) -> Self {
        Reply::Response(res)
    }
}

/// What a handler hands back to the dispatcher.
pub enum Outcome {
    Ready(Reply),
    Deferred(BoxFuture<'static, Result<Reply, HandlerError>>),
}

impl Outcome {
    pub fn ready(reply: impl Into<Reply>) -> Self {
        Outcome::Ready(reply.into())
    }

    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
    {
        Outcome::Deferred(future.boxed())
    }

    pub fn empty() -> Self {
        Outcome::Ready(Reply::Empty)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Outcome::Deferred(_))
    }

    /// Await the value, treating a ready outcome as already resolved.
    pub async fn resolve(self) -> Result<Reply, HandlerError> {
        match self {
            Outcome::Ready(reply) => Ok(reply),
            Outcome::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(reply) => f.debug_tuple("Ready").field(reply).finish(),
            Outcome::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Outcome::Ready(reply)
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Ready(value.into())
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Outcome::Ready(text.into())
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Outcome::Ready(text.into())
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_coercion() {
        assert!(matches!(Reply::from(json!({"a": 1})), Reply::Json(_)));
        assert!(matches!(Reply::from(json!([1, 2])), Reply::Json(_)));
        assert!(matches!(Reply::from(Value::Null), Reply::Empty));
        assert!(matches!(Reply::from(json!("hi")), Reply::Text(t) if t == "hi"));
        assert!(matches!(Reply::from(json!(7)), Reply::Text(t) if t == "7"));
    }

    #[tokio::test]
    async fn test_resolve_ready_and_deferred() {
        let ready = Outcome::from("now").resolve().await.unwrap();
        assert!(matches!(ready, Reply::Text(t) if t == "now"));

        let deferred = Outcome::deferred(async {
            tokio::task::yield_now().await;
            Ok(Reply::from(json!({"later": true})))
        });
        assert!(deferred.is_deferred());
        assert!(matches!(deferred.resolve().await.unwrap(), Reply::Json(_)));
    }

    #[tokio::test]
    async fn test_deferred_failure_propagates() {
        let outcome = Outcome::deferred(async { Err(HandlerError::bad_request("nope")) });
        let err = outcome.resolve().await.unwrap_err();
        assert_eq!(err.message, "nope");
    }
}
