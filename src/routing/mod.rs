//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     routes/ directory
//!     → walker.rs (discover files, base URI segments)
//!     → loader.rs (bind files to registered controller types)
//!     → convention.rs (method identifiers → verb + override)
//!     → uri.rs (compose URL pattern)
//!     → table.rs (RouteEntry list + axum Router)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: the same tree always yields the same table
//! - Any load failure aborts startup

pub mod convention;
pub mod loader;
pub mod table;
pub mod uri;
pub mod walker;

pub use convention::{HttpVerb, MethodDescriptor};
pub use loader::{ControllerLoadError, ControllerRegistry};
pub use table::{build, RouteEntry, RouteTable};
