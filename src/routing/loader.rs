//! Controller loading.
//!
//! Controllers are compiled in, so "loading" a discovered file means looking
//! up the handle registered under its key and checking that the handle
//! exposes a usable method table.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::controller::{Controller, ControllerHandle, TypedHandle};
use crate::routing::walker::DiscoveredController;

/// Fatal error while turning the controller tree into routes.
#[derive(Debug, thiserror::Error)]
pub enum ControllerLoadError {
    #[error("Controller directory cannot be read at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Controller cannot be loaded using location: {path} (no controller registered as `{key}`)")]
    NotRegistered { key: String, path: PathBuf },

    #[error("Controller `{key}` has an invalid method table: {reason}")]
    InvalidMethodTable { key: String, reason: String },

    #[error("Controller `{key}` declares route `{pattern}` that cannot be served: {reason}")]
    InvalidRoute {
        key: String,
        pattern: String,
        reason: String,
    },

    #[error("Controller key `{0}` registered twice")]
    DuplicateRegistration(String),
}

/// Controller types available to the walker, keyed by relative path.
#[derive(Default, Clone)]
pub struct ControllerRegistry {
    handles: HashMap<String, Arc<dyn ControllerHandle>>,
    duplicates: Vec<String>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `C` for the file at `key` (`users`, `index/foo`).
    pub fn register<C: Controller>(self, key: &str) -> Self {
        self.register_handle(key, TypedHandle::<C>::shared())
    }

    pub fn register_handle(mut self, key: &str, handle: Arc<dyn ControllerHandle>) -> Self {
        let key = normalize_key(key);
        if self.handles.insert(key.clone(), handle).is_some() {
            self.duplicates.push(key);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn ControllerHandle>> {
        self.handles.get(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("keys", &self.handles.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim_matches('/').replace('\\', "/")
}

/// A discovered file bound to its controller type.
#[derive(Clone)]
pub struct ControllerDefinition {
    pub name: String,
    pub key: String,
    pub base_uri: Vec<String>,
    pub handle: Arc<dyn ControllerHandle>,
}

impl std::fmt::Debug for ControllerDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerDefinition")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("base_uri", &self.base_uri)
            .field("type", &self.handle.type_name())
            .finish()
    }
}

/// Controllers whose file name starts with `_` are helpers.
pub fn is_private_controller(name: &str) -> bool {
    name.starts_with('_')
}

fn validate_method_table(key: &str, handle: &dyn ControllerHandle) -> Result<(), ControllerLoadError> {
    let invalid = |reason: String| ControllerLoadError::InvalidMethodTable {
        key: key.to_string(),
        reason,
    };

    let mut seen = HashSet::new();
    for method in handle.methods() {
        if method.trim().is_empty() {
            return Err(invalid("empty method identifier".to_string()));
        }
        if !seen.insert(*method) {
            return Err(invalid(format!("method `{}` listed twice", method)));
        }
    }
    Ok(())
}

/// Resolve one discovered file. `Ok(None)` means a private controller.
pub fn load_controller(
    registry: &ControllerRegistry,
    discovered: &DiscoveredController,
) -> Result<Option<ControllerDefinition>, ControllerLoadError> {
    if is_private_controller(&discovered.name) {
        tracing::debug!(key = %discovered.key, "Skipping private controller");
        return Ok(None);
    }

    if registry.duplicates.contains(&discovered.key) {
        return Err(ControllerLoadError::DuplicateRegistration(discovered.key.clone()));
    }

    let handle = registry
        .get(&discovered.key)
        .cloned()
        .ok_or_else(|| ControllerLoadError::NotRegistered {
            key: discovered.key.clone(),
            path: discovered.path.clone(),
        })?;

    validate_method_table(&discovered.key, handle.as_ref())?;

    Ok(Some(ControllerDefinition {
        name: discovered.name.clone(),
        key: discovered.key.clone(),
        base_uri: discovered.base_uri.clone(),
        handle,
    }))
}

/// Resolve every discovered file, stopping at the first failure.
pub fn load_controllers(
    registry: &ControllerRegistry,
    discovered: &[DiscoveredController],
) -> Result<Vec<ControllerDefinition>, ControllerLoadError> {
    let mut definitions = Vec::with_capacity(discovered.len());
    for item in discovered {
        if let Some(definition) = load_controller(registry, item)? {
            definitions.push(definition);
        }
    }
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::controller::{Outcome, RequestContext};
    use crate::http::error::HandlerError;
    use async_trait::async_trait;

    struct Users;

    #[async_trait]
    impl Controller for Users {
        const METHODS: &'static [&'static str] = &["get", "post /activate"];

        fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
            Ok(Users)
        }

        async fn handle(&mut self, _method: &str, _req: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Ok(Outcome::empty())
        }
    }

    struct Broken;

    #[async_trait]
    impl Controller for Broken {
        const METHODS: &'static [&'static str] = &["get", "get"];

        fn create(_req: &RequestContext, _settings: Arc<Settings>) -> Result<Self, HandlerError> {
            Ok(Broken)
        }

        async fn handle(&mut self, _method: &str, _req: &mut RequestContext) -> Result<Outcome, HandlerError> {
            Ok(Outcome::empty())
        }
    }

    fn discovered(key: &str) -> DiscoveredController {
        let name = key.rsplit('/').next().unwrap().to_string();
        DiscoveredController {
            path: PathBuf::from(format!("routes/{}.rs", key)),
            name,
            key: key.to_string(),
            base_uri: vec!["/".to_string()],
        }
    }

    #[test]
    fn test_registered_controller_loads() {
        let registry = ControllerRegistry::new().register::<Users>("/users");
        let def = load_controller(&registry, &discovered("users")).unwrap().unwrap();
        assert_eq!(def.name, "users");
        assert_eq!(def.handle.methods(), &["get", "post /activate"]);
    }

    #[test]
    fn test_private_controller_skipped() {
        let registry = ControllerRegistry::new();
        assert!(load_controller(&registry, &discovered("_helpers")).unwrap().is_none());
    }

    #[test]
    fn test_unregistered_file_is_fatal() {
        let registry = ControllerRegistry::new().register::<Users>("users");
        let err = load_controller(&registry, &discovered("orders")).unwrap_err();
        assert!(matches!(err, ControllerLoadError::NotRegistered { ref key, .. } if key == "orders"));
    }

    #[test]
    fn test_duplicate_methods_rejected() {
        let registry = ControllerRegistry::new().register::<Broken>("broken");
        let err = load_controller(&registry, &discovered("broken")).unwrap_err();
        assert!(matches!(err, ControllerLoadError::InvalidMethodTable { .. }));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = ControllerRegistry::new()
            .register::<Users>("users")
            .register::<Broken>("users");
        let err = load_controller(&registry, &discovered("users")).unwrap_err();
        assert!(matches!(err, ControllerLoadError::DuplicateRegistration(_)));
    }
}
