//! Route table construction.
//!
//! # Data Flow
//! ```text
//! routes/ ─walk─▶ DiscoveredController[]
//!         ─load─▶ ControllerDefinition[]
//!         ─resolve_methods─▶ MethodDescriptor[]
//!         ─compose─▶ RouteEntry[] + axum Router
//! ```
//!
//! # Design Decisions
//! - Built once at startup and immutable afterwards
//! - Rebuilding from an unchanged tree yields the same entries in the same order
//! - The first registration of a verb and path wins; later ones are skipped
//!   with a warning instead of aborting startup

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::Request,
    routing::{any, on, MethodFilter, MethodRouter},
    Router,
};

use crate::config::Settings;
use crate::dispatch::{dispatch, RouteTarget};
use crate::routing::convention::{resolve_methods, HttpVerb};
use crate::routing::loader::{load_controllers, ControllerDefinition, ControllerLoadError, ControllerRegistry};
use crate::routing::uri::{check_axum_path, compose, join_segments, to_axum_path};
use crate::routing::walker::walk;

/// One registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Pattern as composed (`/users/:id`).
    pub url_pattern: String,
    pub http_method: HttpVerb,
    /// Registry key of the owning controller.
    pub controller: String,
    pub method_name: String,
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} {:<32} {}::{}",
            self.http_method.as_str().to_uppercase(),
            self.url_pattern,
            self.controller,
            self.method_name
        )
    }
}

/// Entries plus the router serving them.
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    router: Router,
}

impl RouteTable {
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge the routes into `app`.
    pub fn mount(self, app: Router) -> Router {
        app.merge(self.router)
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("entries", &self.entries)
            .finish()
    }
}

/// Path with parameter names erased, so `/u/{id}` and `/u/{name}` collide.
fn path_shape(axum_path: &str) -> String {
    axum_path
        .split('/')
        .map(|segment| {
            if segment.starts_with("{*") {
                "{*}"
            } else if segment.starts_with('{') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn method_router(verb: HttpVerb, target: Arc<RouteTarget>, settings: Arc<Settings>) -> MethodRouter {
    let handler = move |request: Request| {
        let target = target.clone();
        let settings = settings.clone();
        async move { dispatch(target, settings, request).await }
    };

    match verb.method().and_then(|m| MethodFilter::try_from(m).ok()) {
        Some(filter) => on(filter, handler),
        None => any(handler),
    }
}

/// Builds a [`RouteTable`], tracking which routes are already taken.
struct TableBuilder {
    settings: Arc<Settings>,
    entries: Vec<RouteEntry>,
    router: Router,
    taken: HashSet<(HttpVerb, String)>,
    shapes: HashMap<String, String>,
}

impl TableBuilder {
    fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            entries: Vec::new(),
            router: Router::new(),
            taken: HashSet::new(),
            shapes: HashMap::new(),
        }
    }

    fn add_controller(&mut self, definition: &ControllerDefinition) -> Result<(), ControllerLoadError> {
        let base_uri = join_segments(&definition.base_uri);

        for descriptor in resolve_methods(definition.handle.methods().iter().copied()) {
            let pattern = compose(&base_uri, &descriptor, &definition.name);
            let axum_path = to_axum_path(&pattern);
            check_axum_path(&axum_path).map_err(|reason| ControllerLoadError::InvalidRoute {
                key: definition.key.clone(),
                pattern: pattern.clone(),
                reason: reason.to_string(),
            })?;
            let shape = path_shape(&axum_path);

            // matchit rejects the same shape under different parameter names
            if let Some(existing) = self.shapes.get(&shape) {
                if existing != &axum_path {
                    tracing::warn!(
                        route = %pattern,
                        conflicts_with = %existing,
                        controller = %definition.key,
                        "Skipping route with conflicting parameter names"
                    );
                    continue;
                }
            }

            // `all` owns every verb on its path, so it clashes with anything there
            let clashes = if descriptor.http_method == HttpVerb::All {
                self.entries.iter().any(|e| path_shape(&to_axum_path(&e.url_pattern)) == shape)
            } else {
                self.taken.contains(&(HttpVerb::All, shape.clone()))
            };
            if clashes || !self.taken.insert((descriptor.http_method, shape.clone())) {
                tracing::warn!(
                    method = %descriptor.http_method,
                    route = %pattern,
                    controller = %definition.key,
                    "Skipping duplicate route"
                );
                continue;
            }
            self.shapes.insert(shape, axum_path.clone());

            let target = Arc::new(RouteTarget {
                controller: definition.key.clone(),
                method_name: descriptor.method_name.clone(),
                pattern: pattern.clone(),
                handle: definition.handle.clone(),
            });

            tracing::debug!(
                method = %descriptor.http_method,
                route = %pattern,
                controller = %definition.key,
                handler = %descriptor.method_name,
                "Route registered"
            );

            let router = std::mem::take(&mut self.router);
            self.router = router.route(
                &axum_path,
                method_router(descriptor.http_method, target, self.settings.clone()),
            );
            self.entries.push(RouteEntry {
                url_pattern: pattern,
                http_method: descriptor.http_method,
                controller: definition.key.clone(),
                method_name: descriptor.method_name,
            });
        }
        Ok(())
    }

    fn finish(self) -> RouteTable {
        RouteTable {
            entries: self.entries,
            router: self.router,
        }
    }
}

/// Walk `root`, load every controller and register its routes.
///
/// Any load failure aborts the whole build; a partial table is never
/// returned.
pub fn build(
    root: &Path,
    registry: &ControllerRegistry,
    settings: Arc<Settings>,
) -> Result<RouteTable, ControllerLoadError> {
    let discovered = walk(root)?;
    let definitions = load_controllers(registry, &discovered)?;

    let mut builder = TableBuilder::new(settings);
    for definition in &definitions {
        builder.add_controller(definition)?;
    }

    let table = builder.finish();
    tracing::info!(
        root = %root.display(),
        controllers = definitions.len(),
        routes = table.len(),
        "Route table built"
    );
    Ok(table)
}
