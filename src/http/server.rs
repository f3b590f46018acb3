//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the route table from the controller directory
//! - Mount mock endpoints and the interception layer in e2e testing mode
//! - Wire up middleware (body limit, timeout, request ID, tracing)
//! - Serve until shutdown

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Request, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::controller::context::X_REQUEST_ID;
use crate::dispatch::{intercept_mocks, InterceptState};
use crate::http::error::not_found;
use crate::mock::{mock_router, MockStore};
use crate::routing::{build, ControllerLoadError, ControllerRegistry, RouteEntry};

/// HTTP server for an application.
pub struct HttpServer {
    router: Router,
    settings: Arc<Settings>,
    routes: Vec<RouteEntry>,
}

impl HttpServer {
    /// Build the server. Fails when any controller cannot be loaded.
    pub fn new(
        settings: Arc<Settings>,
        registry: &ControllerRegistry,
        mocks: Arc<MockStore>,
    ) -> Result<Self, ControllerLoadError> {
        let table = build(Path::new(&settings.routes_dir), registry, settings.clone())?;
        let routes = table.entries().to_vec();

        let router = Self::build_router(&settings, table.into_router(), mocks);
        Ok(Self {
            router,
            settings,
            routes,
        })
    }

    #[allow(deprecated)]
    fn build_router(settings: &Settings, routes: Router, mocks: Arc<MockStore>) -> Router {
        let mut app = routes;

        if settings.e2e_testing_mode {
            tracing::warn!("E2E testing mode enabled: mock endpoints exposed");
            app = app.merge(mock_router(mocks.clone()));
        }

        // Unmatched verbs on a known path share the 404 of unknown paths
        app = app.method_not_allowed_fallback(not_found).fallback(not_found);

        if settings.e2e_testing_mode {
            let state = InterceptState {
                store: mocks,
                body_limit: settings.app.body_size_limit,
            };
            app = app.layer(middleware::from_fn_with_state(state, intercept_mocks));
        }

        app.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(settings.app.body_size_limit))
                .layer(TimeoutLayer::new(Duration::from_secs(settings.app.request_timeout_secs))),
        )
    }

    /// The assembled router, for driving the app without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the server, accepting connections on the given listener, until
    /// `shutdown` fires or Ctrl+C is received.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            e2e_testing_mode = self.settings.e2e_testing_mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for the shutdown broadcast or Ctrl+C.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown signal received"),
        _ = shutdown.recv() => tracing::info!("Shutdown requested"),
    }
}
