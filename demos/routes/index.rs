use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use routewright::{Controller, HandlerError, Outcome, RequestContext, Settings};

/// Served at `/` and, through a strict override, `/health`.
pub struct Home {
    settings: Arc<Settings>,
}

#[async_trait]
impl Controller for Home {
    const METHODS: &'static [&'static str] = &["get", "get ^/health"];

    fn create(_req: &RequestContext, settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Self { settings })
    }

    async fn handle(&mut self, method: &str, _req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        match method {
            "get" => Ok(json!({
                "name": self.settings.app.name,
                "e2e": self.settings.e2e_testing_mode,
            })
            .into()),
            "get ^/health" => Ok("ok".into()),
            other => Err(HandlerError::not_found(other)),
        }
    }
}
