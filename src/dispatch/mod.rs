//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → intercept.rs (e2e testing mode: answer from MockStore)
//!     → lifecycle.rs (instantiate, before hook, handler, after hook)
//!     → response.rs (await, coerce to JSON or raw body)
//!     → Response | http::error (shared error envelope)
//! ```
//!
//! # Design Decisions
//! - One controller instance per request
//! - A response sent by a handler is final; later writes are dropped
//! - No retries at this layer

pub mod intercept;
pub mod lifecycle;
pub mod response;

pub use intercept::{intercept_mocks, InterceptState};
pub use lifecycle::{dispatch, RouteTarget};
