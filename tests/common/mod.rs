//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use routewright::controller::Reply;
use routewright::{
    Controller, ControllerRegistry, HandlerError, HttpServer, MockStore, Outcome, RequestContext, RouteEntry,
    Settings,
};

/// Records the hook order in `x-hooks`.
pub struct Tracker {
    trail: Vec<&'static str>,
}

#[async_trait]
impl Controller for Tracker {
    const METHODS: &'static [&'static str] = &["get", "post /:id", "beforeRequest", "afterRequest"];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Self { trail: vec!["create"] })
    }

    async fn before_request(&mut self, req: &mut RequestContext) -> Result<(), HandlerError> {
        if req.header("x-deny").is_some() {
            return Err(HandlerError::new(StatusCode::FORBIDDEN, "denied by hook"));
        }
        self.trail.push("before");
        Ok(())
    }

    async fn handle(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        self.trail.push("handler");
        match method {
            "get" => Ok(json!({"ok": true}).into()),
            "post /:id" => Ok(json!({
                "id": req.param("id"),
                "q": req.query("q"),
                "body": req.json::<Value>()?,
            })
            .into()),
            other => Err(HandlerError::not_found(other)),
        }
    }

    async fn after_request(&mut self, _outcome: &mut Outcome, req: &mut RequestContext) -> Result<(), HandlerError> {
        self.trail.push("after");
        req.insert_header("x-hooks", &self.trail.join(","))
    }
}

/// Every way a handler can fail.
pub struct Failing;

#[async_trait]
impl Controller for Failing {
    const METHODS: &'static [&'static str] = &["get", "get /hidden", "get /exposed", "get /labelled"];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Failing)
    }

    async fn handle(&mut self, method: &str, _req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        Err(match method {
            "get" => HandlerError::bad_request("bad input").with_code(42),
            "get /hidden" => HandlerError::internal("database password leaked"),
            "get /exposed" => HandlerError::internal("upstream unavailable").exposed(),
            _ => HandlerError::new(StatusCode::CONFLICT, "already exists").with_label("Duplicate"),
        })
    }
}

/// Writes its own response.
pub struct Sender;

#[async_trait]
impl Controller for Sender {
    const METHODS: &'static [&'static str] = &["get", "get /twice", "get /then-fail"];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Sender)
    }

    async fn handle(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        match method {
            "get" => {
                req.send((StatusCode::ACCEPTED, "sent directly"));
                Ok(json!({"ignored": true}).into())
            }
            "get /twice" => {
                let first = req.send("first");
                let second = req.send("second");
                Ok(json!({"first": first, "second": second}).into())
            }
            _ => {
                req.send("partial");
                Err(HandlerError::internal("failed after send"))
            }
        }
    }
}

/// Answers through deferred outcomes; mounted from `index/`.
pub struct Deferred;

#[async_trait]
impl Controller for Deferred {
    const METHODS: &'static [&'static str] = &["getValue", "get ^/deferred-error", "helper"];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Deferred)
    }

    async fn handle(&mut self, method: &str, _req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        match method {
            "getValue" => Ok(Outcome::deferred(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Reply::Json(json!({"deferred": true})))
            })),
            _ => Ok(Outcome::deferred(async {
                Err(HandlerError::new(StatusCode::BAD_GATEWAY, "rejected later").exposed())
            })),
        }
    }
}

/// Fails in its constructor.
pub struct Unbuildable;

#[async_trait]
impl Controller for Unbuildable {
    const METHODS: &'static [&'static str] = &["get"];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Err(HandlerError::new(StatusCode::SERVICE_UNAVAILABLE, "not ready").exposed())
    }

    async fn handle(&mut self, _method: &str, _req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        unreachable!("constructor always fails")
    }
}

pub const ROUTE_FILES: &[&str] = &[
    "tracker.rs",
    "failing.rs",
    "sender.rs",
    "unbuildable.rs",
    "index/deferred.rs",
    "_helpers.rs",
];

pub fn registry() -> ControllerRegistry {
    ControllerRegistry::new()
        .register::<Tracker>("tracker")
        .register::<Failing>("failing")
        .register::<Sender>("sender")
        .register::<Unbuildable>("unbuildable")
        .register::<Deferred>("index/deferred")
}

/// Create a controller tree with empty files.
pub fn routes_tree(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    dir
}

pub fn settings_for(root: &Path, e2e: bool) -> Settings {
    Settings {
        routes_dir: root.to_string_lossy().into_owned(),
        e2e_testing_mode: e2e,
        ..Settings::default()
    }
}

/// A fully assembled application over a temporary controller tree.
pub struct TestApp {
    _dir: TempDir,
    pub router: Router,
    pub mocks: Arc<MockStore>,
    pub routes: Vec<RouteEntry>,
}

impl TestApp {
    pub fn new(e2e: bool) -> Self {
        let dir = routes_tree(ROUTE_FILES);
        let settings = Arc::new(settings_for(dir.path(), e2e));
        let mocks = Arc::new(MockStore::new());
        let server = HttpServer::new(settings, &registry(), mocks.clone()).unwrap();

        Self {
            router: server.router(),
            routes: server.routes().to_vec(),
            mocks,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
