//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, tracing)
//!     → [dispatch: mock interception, controller lifecycle]
//!     → error.rs (shared error envelope, 404 fallback)
//!     → Send to client
//! ```

pub mod error;
pub mod server;

pub use error::{FrameworkError, HandlerError};
pub use server::HttpServer;
