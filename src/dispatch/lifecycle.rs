//! Per-request lifecycle.
//!
//! ```text
//! Received → Instantiated → BeforeHook → Handler → AfterHook
//!          → ResponseSent | ErrorForwarded
//! ```
//!
//! Every failure is returned to the caller and rendered by the shared error
//! path; nothing here retries or swallows errors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::Settings;
use crate::controller::{ControllerHandle, RequestContext};
use crate::dispatch::response::coerce;
use crate::http::error::{FrameworkError, HandlerError};
use crate::observability::metrics;

/// Everything a route needs to run its controller method.
pub struct RouteTarget {
    pub controller: String,
    pub method_name: String,
    pub pattern: String,
    pub handle: Arc<dyn ControllerHandle>,
}

impl std::fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTarget")
            .field("controller", &self.controller)
            .field("method_name", &self.method_name)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Entry point registered on the router for each route.
pub async fn dispatch(target: Arc<RouteTarget>, settings: Arc<Settings>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let log_requests = settings.logging.log_requests;

    let response = match run(&target, settings, request, started).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    let status = response.status().as_u16();
    metrics::record_request(&method, status, &target.pattern, started);
    if log_requests {
        tracing::info!(
            method = %method,
            path = %path,
            route = %target.pattern,
            status,
            latency_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
    }

    response
}

async fn run(
    target: &RouteTarget,
    settings: Arc<Settings>,
    request: Request<Body>,
    started: Instant,
) -> Result<Response, FrameworkError> {
    let (mut parts, body) = request.into_parts();

    let params: HashMap<String, String> = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .map(|raw| {
            raw.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let body = to_bytes(body, settings.app.body_size_limit)
        .await
        .map_err(|_| HandlerError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"))?;

    let mut ctx = RequestContext::new(parts.method, parts.uri, parts.headers, body)
        .with_params(params)
        .with_start(started);

    match run_controller(target, settings, &mut ctx).await {
        Ok(response) => Ok(response),
        Err(err) => match ctx.take_sent() {
            Some(sent) => {
                tracing::warn!(
                    route = %target.pattern,
                    error = %err,
                    "Error raised after the response was sent"
                );
                Ok(sent)
            }
            None => Err(err.into()),
        },
    }
}

async fn run_controller(
    target: &RouteTarget,
    settings: Arc<Settings>,
    ctx: &mut RequestContext,
) -> Result<Response, HandlerError> {
    let mut instance = target.handle.instantiate(ctx, settings)?;

    instance.run_before(ctx).await?;
    let mut outcome = instance.run_handler(&target.method_name, ctx).await?;
    instance.run_after(&mut outcome, ctx).await?;

    coerce(outcome, ctx).await
}
