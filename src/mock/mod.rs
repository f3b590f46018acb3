//! Mock interception subsystem.
//!
//! # Data Flow
//! ```text
//! POST /mocks/api (JSON MockDefinition)
//!     → endpoints.rs (parse, default missing fields)
//!     → store.rs (append)
//!
//! Incoming request (e2e testing mode)
//!     → dispatch::intercept (buffer body)
//!     → matcher.rs (url, method, canonical body, partial fallback)
//!     → store.rs (first match; one-shot mocks removed under the same lock)
//!     → literal mock response, controller skipped
//! ```

pub mod definition;
pub mod endpoints;
pub mod matcher;
pub mod store;

pub use definition::MockDefinition;
pub use endpoints::{mock_router, MOCKS_PATH};
pub use matcher::{IncomingBody, MockNormalizationError};
pub use store::MockStore;
