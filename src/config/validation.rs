//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted into the system

use std::net::SocketAddr;

use crate::config::schema::Settings;

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.host.trim().is_empty() {
        errors.push(ValidationError::new("host", "must not be empty"));
    }
    if settings.routes_dir.trim().is_empty() {
        errors.push(ValidationError::new("routes_dir", "must not be empty"));
    }
    if settings.app.body_size_limit == 0 {
        errors.push(ValidationError::new("app.body_size_limit", "must be greater than 0"));
    }
    if settings.app.request_timeout_secs == 0 {
        errors.push(ValidationError::new("app.request_timeout_secs", "must be greater than 0"));
    }
    if settings.metrics.enabled && settings.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "metrics.address",
            format!("`{}` is not a socket address", settings.metrics.address),
        ));
    }
    if settings.logging.level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level `{}`", settings.logging.level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_settings(&Settings::default()), Ok(()));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut settings = Settings::default();
        settings.routes_dir = String::new();
        settings.app.body_size_limit = 0;
        settings.logging.level = "loud".to_string();
        settings.metrics.enabled = true;
        settings.metrics.address = "nowhere".to_string();

        let errors = validate_settings(&settings).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["routes_dir", "app.body_size_limit", "metrics.address", "logging.level"]
        );
    }
}
