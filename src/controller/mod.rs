//! Controller contract.
//!
//! # Data Flow
//! ```text
//! routes/users.rs  ──(registry key "users")──▶  ControllerHandle
//!     Controller::METHODS  → route table (at startup)
//!     Controller::create   → one instance per request
//!     before_request → handle(method) → after_request → Outcome
//! ```
//!
//! # Design Decisions
//! - Routes come from a static method table, not from introspection
//! - A fresh instance per request; instances never outlive the request
//! - Hooks default to no-ops, so "defined" means "overridden"

pub mod context;
pub mod outcome;

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Settings;
use crate::http::error::HandlerError;

pub use context::RequestContext;
pub use outcome::{Outcome, Reply};

/// A type whose methods are served as routes.
///
/// ```ignore
/// pub struct Users { settings: Arc<Settings> }
///
/// #[async_trait]
/// impl Controller for Users {
///     const METHODS: &'static [&'static str] = &["get", "post /activate"];
///
///     fn create(_req: &RequestContext, settings: Arc<Settings>) -> Result<Self, HandlerError> {
///         Ok(Self { settings })
///     }
///
///     async fn handle(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError> {
///         match method {
///             "get" => Ok(json!([{"name": "ada"}]).into()),
///             "post /activate" => Ok(Outcome::empty()),
///             _ => Err(HandlerError::not_found(method)),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Controller: Send + Sized + 'static {
    /// Method identifiers, parsed with the naming conventions in
    /// [`crate::routing::convention`]. Identifiers without a verb prefix are
    /// helpers and are never routed.
    const METHODS: &'static [&'static str];

    /// Build the per-request instance.
    fn create(req: &RequestContext, settings: Arc<Settings>) -> Result<Self, HandlerError>;

    async fn before_request(&mut self, _req: &mut RequestContext) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Invoke the method registered under `method`.
    async fn handle(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError>;

    async fn after_request(
        &mut self,
        _outcome: &mut Outcome,
        _req: &mut RequestContext,
    ) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Object-safe view of a live controller instance.
#[async_trait]
pub trait ControllerInstance: Send {
    async fn run_before(&mut self, req: &mut RequestContext) -> Result<(), HandlerError>;

    async fn run_handler(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError>;

    async fn run_after(&mut self, outcome: &mut Outcome, req: &mut RequestContext) -> Result<(), HandlerError>;
}

#[async_trait]
impl<C: Controller> ControllerInstance for C {
    async fn run_before(&mut self, req: &mut RequestContext) -> Result<(), HandlerError> {
        Controller::before_request(self, req).await
    }

    async fn run_handler(&mut self, method: &str, req: &mut RequestContext) -> Result<Outcome, HandlerError> {
        Controller::handle(self, method, req).await
    }

    async fn run_after(&mut self, outcome: &mut Outcome, req: &mut RequestContext) -> Result<(), HandlerError> {
        Controller::after_request(self, outcome, req).await
    }
}

/// A constructible controller type, resolved once at load time.
pub trait ControllerHandle: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn methods(&self) -> &'static [&'static str];

    fn instantiate(
        &self,
        req: &RequestContext,
        settings: Arc<Settings>,
    ) -> Result<Box<dyn ControllerInstance>, HandlerError>;
}

/// [`ControllerHandle`] for a concrete [`Controller`] type.
pub struct TypedHandle<C> {
    _marker: PhantomData<fn() -> C>,
}

impl<C: Controller> TypedHandle<C> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    pub fn shared() -> Arc<dyn ControllerHandle> {
        Arc::new(Self::new())
    }
}

impl<C: Controller> Default for TypedHandle<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Controller> ControllerHandle for TypedHandle<C> {
    fn type_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn methods(&self) -> &'static [&'static str] {
        C::METHODS
    }

    fn instantiate(
        &self,
        req: &RequestContext,
        settings: Arc<Settings>,
    ) -> Result<Box<dyn ControllerInstance>, HandlerError> {
        Ok(Box::new(C::create(req, settings)?))
    }
}
