//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! app-settings.toml ([default], [production], ...)
//!     → loader.rs (select env, merge over default, ${VAR} interpolation)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc with the server and every controller instance
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, LogFormat, LoggingConfig, MetricsConfig, Settings};
