use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use routewright::{Controller, HandlerError, Outcome, Reply, RequestContext, Settings};

use crate::shared::id_param;

/// Project lookups; `get /:id` answers asynchronously.
pub struct Projects;

#[async_trait]
impl Controller for Projects {
    const METHODS: &'static [&'static str] = &["getProjects", "get /:id", "all /echo", "formatName"];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Projects)
    }

    async fn handle(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        match method {
            "getProjects" => Ok(json!([
                {"id": 1, "name": Self::format_name("routing")},
                {"id": 2, "name": Self::format_name("mocks")},
            ])
            .into()),
            "get /:id" => {
                let id = id_param(req)?;
                Ok(Outcome::deferred(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(Reply::Json(json!({"id": id, "name": Self::format_name("deferred")})))
                }))
            }
            "all /echo" => Ok(json!({
                "method": req.method().as_str(),
                "body": req.text()?,
            })
            .into()),
            other => Err(HandlerError::not_found(other)),
        }
    }
}

impl Projects {
    /// Listed in `METHODS` but never routed: no verb prefix.
    fn format_name(name: &str) -> String {
        format!("project-{name}")
    }
}
