//! Result coercion.
//!
//! # Responsibilities
//! - Await deferred handler results
//! - Write structured values as JSON and everything else as a raw body
//! - Never write over a response a handler already sent

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::controller::{Outcome, Reply, RequestContext};
use crate::http::error::HandlerError;

/// Turn a resolved reply into a response with the handler's status and
/// extra headers applied.
pub fn render_reply(reply: Reply, status: StatusCode, headers: &HeaderMap) -> Response {
    let mut response = match reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Text(text) => text.into_response(),
        Reply::Empty => ().into_response(),
        Reply::Response(response) => return response,
    };

    *response.status_mut() = status;
    for (name, value) in headers {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}

/// Resolve `outcome` and build the response for it.
pub async fn coerce(outcome: Outcome, ctx: &RequestContext) -> Result<Response, HandlerError> {
    if let Some(sent) = ctx.take_sent() {
        tracing::debug!(path = %ctx.path(), "Handler sent its own response");
        return Ok(sent);
    }

    let reply = outcome.resolve().await?;

    if let Some(sent) = ctx.take_sent() {
        return Ok(sent);
    }

    Ok(render_reply(reply, ctx.status(), ctx.response_headers()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};
    use axum::http::{header, Method};
    use serde_json::json;

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, "/".parse().unwrap(), HeaderMap::new(), Bytes::new())
    }

    async fn body_of(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_structured_value_is_json() {
        let response = coerce(Outcome::from(json!({"id": 1})), &ctx()).await.unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_of(response).await, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_null_becomes_empty_body() {
        let response = coerce(Outcome::from(serde_json::Value::Null), &ctx()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, "");
    }

    #[tokio::test]
    async fn test_status_and_headers_applied() {
        let mut ctx = ctx();
        ctx.set_status(StatusCode::CREATED);
        ctx.insert_header("x-resource", "42").unwrap();
        let response = coerce(Outcome::from("made"), &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-resource").unwrap(), "42");
        assert_eq!(body_of(response).await, "made");
    }

    #[tokio::test]
    async fn test_sent_response_wins() {
        let ctx = ctx();
        ctx.send((StatusCode::ACCEPTED, "already"));
        let outcome = Outcome::deferred(async { Ok(Reply::from("ignored")) });
        let response = coerce(outcome, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_of(response).await, "already");
    }
}
