//! Configuration schema definitions.
//!
//! This module defines the resolved settings handed to the server and to
//! every controller instance. All types derive Serde traits for
//! deserialization from the settings file.

use serde::{Deserialize, Serialize};

/// Root settings for an application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Interface to bind (e.g., "127.0.0.1").
    pub host: String,

    /// Port to bind. `0` defers to the `PORT` variable, then 3000.
    pub port: u16,

    /// Root directory scanned for controller files.
    pub routes_dir: String,

    /// Serve registered mocks ahead of controllers.
    pub e2e_testing_mode: bool,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Application settings.
    pub app: AppConfig,

    /// Metrics exposition settings.
    pub metrics: MetricsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            routes_dir: "routes".to_string(),
            e2e_testing_mode: false,
            logging: LoggingConfig::default(),
            app: AppConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    pub format: LogFormat,

    /// Emit one event per completed request.
    pub log_requests: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            log_requests: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used in startup logs.
    pub name: String,

    /// Maximum request body size in bytes.
    pub body_size_limit: usize,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    pub cookie_secret: String,

    pub session_secret: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            body_size_limit: 10 * 1024 * 1024, // 10MB
            request_timeout_secs: 30,
            cookie_secret: "${APP_SETTINGS_COOKIE_SECRET}".to_string(),
            session_secret: "${APP_SETTINGS_SESSION_SECRET}".to_string(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus endpoint.
    pub enabled: bool,

    /// Metrics endpoint bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}
