//! Route URI composition.
//!
//! Three addressing styles per method:
//! - conventional: `get` on `users` → `/users`
//! - relative override: `get /active` on `users` → `/users/active`
//! - strict override: `get ^/health` anywhere → `/health`

use crate::routing::convention::{MethodDescriptor, STRICT_MARKER};

/// Controller name that maps onto its directory's own URI.
pub const INDEX_CONTROLLER: &str = "index";

/// Collapse every run of `/` into a single slash.
pub fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if !prev_slash {
                out.push(ch);
            }
            prev_slash = true;
        } else {
            out.push(ch);
            prev_slash = false;
        }
    }
    out
}

/// Join base URI segments (`["/", "api", "v1"]`) into `/api/v1`.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let joined = segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/");
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let collapsed = collapse_slashes(path);
    if collapsed.is_empty() {
        "/".to_string()
    } else {
        collapsed
    }
}

/// Compute the final URL pattern for a controller method.
pub fn compose(base_uri: &str, descriptor: &MethodDescriptor, controller_name: &str) -> String {
    if descriptor.is_strict() {
        if let Some(route) = descriptor.route_override.as_deref() {
            return normalize(route.trim_start_matches(STRICT_MARKER));
        }
    }

    let mut parts = vec![base_uri];
    if controller_name != INDEX_CONTROLLER {
        parts.push(controller_name);
    }
    if let Some(route) = descriptor.route_override.as_deref() {
        parts.push(route);
    }

    normalize(&parts.join("/"))
}

/// Translate an express-style pattern (`/users/:id`, `/files/*`) into axum
/// path syntax (`/users/{id}`, `/files/{*wildcard}`).
pub fn to_axum_path(pattern: &str) -> String {
    let translated: Vec<String> = pattern
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{}}}", name)
            } else if segment == "*" {
                "{*wildcard}".to_string()
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{}}}", name)
            } else {
                segment.to_string()
            }
        })
        .collect();
    translated.join("/")
}

/// Check a translated path against what the axum router accepts.
///
/// Returns the reason the path would be refused at registration.
pub fn check_axum_path(path: &str) -> Result<(), &'static str> {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);

    for (i, segment) in segments.iter().enumerate() {
        if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            let (name, catch_all) = match inner.strip_prefix('*') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            if name.is_empty() || name.contains(['{', '}', '*']) {
                return Err("parameter needs a plain name");
            }
            if catch_all && i != last {
                return Err("wildcard is only allowed as the last segment");
            }
        } else if segment.contains(['{', '}']) {
            return Err("braces are not allowed in literal segments");
        }
    }
    Ok(())
}
