use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use routewright::{Controller, HandlerError, Outcome, Reply, RequestContext, Settings};

use crate::shared::{id_param, limit};

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    name: String,
    active: bool,
    token: String,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

static USERS: Mutex<Vec<User>> = Mutex::new(Vec::new());

fn users() -> std::sync::MutexGuard<'static, Vec<User>> {
    USERS.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory user directory.
///
/// | identifier          | route                        |
/// |---------------------|------------------------------|
/// | `get`               | `GET /users`                 |
/// | `get /:id`          | `GET /users/:id`             |
/// | `post`              | `POST /users`                |
/// | `post /:id/activate`| `POST /users/:id/activate`   |
/// | `delete /:id`       | `DELETE /users/:id`          |
pub struct Users {
    requester: Option<String>,
}

#[async_trait]
impl Controller for Users {
    const METHODS: &'static [&'static str] = &[
        "get",
        "get /:id",
        "post",
        "post /:id/activate",
        "delete /:id",
    ];

    fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
        Ok(Self { requester: None })
    }

    async fn before_request(&mut self, req: &mut RequestContext) -> Result<(), HandlerError> {
        self.requester = req.header("x-user").map(str::to_string);
        if *req.method() != Method::GET && self.requester.is_none() {
            return Err(HandlerError::new(StatusCode::UNAUTHORIZED, "x-user header required"));
        }
        Ok(())
    }

    async fn handle(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        match method {
            "get" => {
                let page: Vec<User> = users().iter().take(limit(req)).cloned().collect();
                Ok(Reply::from_serialize(&page)?.into())
            }
            "get /:id" => {
                let id = id_param(req)?;
                let user = users()
                    .iter()
                    .find(|u| u.id == id)
                    .cloned()
                    .ok_or_else(|| HandlerError::not_found(format!("No user {id}")))?;
                Ok(Reply::from_serialize(&user)?.into())
            }
            "post" => {
                let input: NewUser = req.json()?;
                let mut all = users();
                let user = User {
                    id: all.len() as u64 + 1,
                    name: input.name,
                    active: false,
                    token: uuid::Uuid::new_v4().to_string(),
                };
                all.push(user.clone());
                req.set_status(StatusCode::CREATED);
                Ok(Reply::from_serialize(&user)?.into())
            }
            "post /:id/activate" => {
                let id = id_param(req)?;
                let mut all = users();
                let user = all
                    .iter_mut()
                    .find(|u| u.id == id)
                    .ok_or_else(|| HandlerError::not_found(format!("No user {id}")))?;
                user.active = true;
                Ok(Outcome::empty())
            }
            "delete /:id" => {
                let id = id_param(req)?;
                users().retain(|u| u.id != id);
                req.set_status(StatusCode::NO_CONTENT);
                Ok(Outcome::empty())
            }
            other => Err(HandlerError::not_found(other)),
        }
    }

    async fn after_request(&mut self, _outcome: &mut Outcome, req: &mut RequestContext) -> Result<(), HandlerError> {
        if let Some(user) = &self.requester {
            req.insert_header("x-served-for", user)?;
        }
        Ok(())
    }
}
