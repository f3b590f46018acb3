//! Configuration loading from disk.
//!
//! A settings file holds one table per environment:
//!
//! ```toml
//! [default]
//! port = 3000
//!
//! [production]
//! e2e_testing_mode = false
//! app.cookie_secret = "${COOKIE_SECRET}"
//! ```
//!
//! The active environment is merged over `default`, `${VAR}` placeholders
//! are replaced from the process environment, and the result is validated.

use std::fs;
use std::path::Path;

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "app-settings.toml";

/// Environment used when none is selected.
pub const DEFAULT_ENV: &str = "default";

/// Variable selecting the active environment.
pub const ENV_VAR: &str = "APP_ENV";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment specified: {env}; available environments are: {}", .available.join(", "))]
    UnknownEnvironment { env: String, available: Vec<String> },

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the active environment name from an explicit choice or `APP_ENV`.
pub fn active_env(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_VAR).ok())
        .filter(|env| !env.is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Load, merge and validate settings from a TOML file.
pub fn load_config(path: &Path, env: &str) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content, env)
}

/// Merge and validate settings from TOML text.
pub fn parse_config(content: &str, env: &str) -> Result<Settings, ConfigError> {
    let root: toml::Table = toml::from_str(content)?;

    let available: Vec<String> = root
        .iter()
        .filter(|(_, value)| value.is_table())
        .map(|(key, _)| key.clone())
        .collect();
    if !available.iter().any(|name| name == env) {
        return Err(ConfigError::UnknownEnvironment {
            env: env.to_string(),
            available,
        });
    }

    let mut merged = defaults_table();
    if let Some(toml::Value::Table(base)) = root.get(DEFAULT_ENV) {
        merge_tables(&mut merged, base);
    }
    if env != DEFAULT_ENV {
        if let Some(toml::Value::Table(overrides)) = root.get(env) {
            merge_tables(&mut merged, overrides);
        }
    }

    let mut value = toml::Value::Table(merged);
    interpolate_env(&mut value, &|name| std::env::var(name).ok());

    let settings = value.try_into::<Settings>()?;
    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

fn defaults_table() -> toml::Table {
    match toml::Value::try_from(Settings::default()) {
        Ok(toml::Value::Table(table)) => table,
        _ => toml::Table::new(),
    }
}

/// Deep-merge `overlay` into `base`; tables merge, everything else replaces.
pub fn merge_tables(base: &mut toml::Table, overlay: &toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Replace `${NAME}` in every string with `lookup(NAME)`, or nothing.
pub fn interpolate_env(value: &mut toml::Value, lookup: &dyn Fn(&str) -> Option<String>) {
    match value {
        toml::Value::String(s) => *s = replace_placeholders(s, lookup),
        toml::Value::Array(items) => {
            for item in items {
                interpolate_env(item, lookup);
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                interpolate_env(item, lookup);
            }
        }
        _ => {}
    }
}

fn replace_placeholders(input: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end)
                if end > 0
                    && after[..end]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
            {
                out.push_str(&lookup(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            _ => {
                out.push_str("${");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
