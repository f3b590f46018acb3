//! Convention-over-configuration HTTP routing.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes/                 ┌────────────────────────────────────────────┐
//!   ├── index.rs            │ routing                                    │
//!   ├── users.rs   ───────▶ │  walker → loader → convention → uri → table│
//!   └── api/projects.rs     └──────────────────────┬─────────────────────┘
//!                                                  │ axum Router
//!                                                  ▼
//!     Client Request        ┌─────────┐    ┌──────────────┐    ┌────────────┐
//!     ─────────────────────▶│  http   │───▶│   dispatch   │───▶│ controller │
//!                           │ server  │    │ mock │ life- │    │  instance  │
//!     Client Response       │         │◀───│ intercept    │◀───│            │
//!     ◀─────────────────────│         │    │ │ cycle      │    └────────────┘
//!                           └─────────┘    └──────────────┘
//!
//!   Cross-cutting: config, observability, lifecycle, mock store
//! ```
//!
//! Applications register their controller types under the file paths the
//! walker discovers, then hand the registry to [`lifecycle::launch`]:
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> Result<(), routewright::StartupError> {
//!     let registry = ControllerRegistry::new()
//!         .register::<Home>("index")
//!         .register::<Users>("users");
//!     routewright::launch(LaunchArgs::parse(), registry).await
//! }
//! ```

// Core subsystems
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod http;
pub mod routing;

// Testing support
pub mod mock;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::Settings;
pub use controller::{Controller, Outcome, Reply, RequestContext};
pub use http::{FrameworkError, HandlerError, HttpServer};
pub use lifecycle::{launch, LaunchArgs, Shutdown, StartupError};
pub use mock::{MockDefinition, MockStore};
pub use routing::{ControllerRegistry, HttpVerb, RouteEntry};
