//! Method naming conventions.
//!
//! # Responsibilities
//! - Decide which controller method identifiers are routes
//! - Extract the HTTP verb from an identifier
//! - Extract an optional route override (`"get /active"`, `"post ^/hooks"`)
//!
//! # Design Decisions
//! - Verbs are matched as lowercase prefixes, never case-folded
//! - camelCase tails (`getProjectsById`) only name the handler; they never
//!   contribute to the URL
//! - Lifecycle hook names are reserved and never routed

use std::fmt;
use std::str::FromStr;

/// Identifiers reserved for lifecycle hooks.
pub const RESERVED_METHODS: [&str; 2] = ["beforeRequest", "afterRequest"];

/// Prefix marking a route override as strict (absolute).
pub const STRICT_MARKER: char = '^';

/// HTTP verbs a controller method may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Options,
    /// Matches every method.
    All,
}

impl HttpVerb {
    /// All verbs in recognition order.
    pub const ALL: [HttpVerb; 8] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Delete,
        HttpVerb::Head,
        HttpVerb::Patch,
        HttpVerb::Options,
        HttpVerb::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
            HttpVerb::Head => "head",
            HttpVerb::Patch => "patch",
            HttpVerb::Options => "options",
            HttpVerb::All => "all",
        }
    }

    /// The concrete HTTP method, or `None` for [`HttpVerb::All`].
    pub fn method(&self) -> Option<axum::http::Method> {
        use axum::http::Method;
        match self {
            HttpVerb::Get => Some(Method::GET),
            HttpVerb::Post => Some(Method::POST),
            HttpVerb::Put => Some(Method::PUT),
            HttpVerb::Delete => Some(Method::DELETE),
            HttpVerb::Head => Some(Method::HEAD),
            HttpVerb::Patch => Some(Method::PATCH),
            HttpVerb::Options => Some(Method::OPTIONS),
            HttpVerb::All => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a token is not one of the recognized verbs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized http verb `{0}`")]
pub struct UnknownVerb(pub String);

impl FromStr for HttpVerb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpVerb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| UnknownVerb(s.to_string()))
    }
}

/// A controller method resolved into a verb and optional route override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub http_method: HttpVerb,
    /// Identifier used to invoke the handler on the controller.
    pub method_name: String,
    pub route_override: Option<String>,
}

impl MethodDescriptor {
    /// True when the override replaces the computed base URI entirely.
    pub fn is_strict(&self) -> bool {
        self.route_override
            .as_deref()
            .is_some_and(|route| route.starts_with("^/"))
    }
}

fn is_route_fragment(token: &str) -> bool {
    token.starts_with('/') || token.starts_with("^/")
}

/// Whether an identifier should be turned into a route at all.
pub fn is_route_method(identifier: &str) -> bool {
    if RESERVED_METHODS.contains(&identifier) {
        return false;
    }
    if is_route_fragment(identifier) {
        return true;
    }
    HttpVerb::ALL
        .iter()
        .any(|verb| identifier.starts_with(verb.as_str()))
}

/// Splits `getProjectsById` into `["get", "Projects", "By", "Id"]`.
fn split_camel_case(identifier: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, ch) in identifier.char_indices() {
        if ch.is_uppercase() && idx > start {
            parts.push(&identifier[start..idx]);
            start = idx;
        }
    }
    if start < identifier.len() {
        parts.push(&identifier[start..]);
    }
    parts
}

/// Parse a method identifier into a [`MethodDescriptor`].
///
/// Returns `None` when the extracted verb is not recognized, which is how
/// helpers such as `getter` or `postpone` fall out of the route table.
pub fn parse_method_name(identifier: &str) -> Option<MethodDescriptor> {
    let tokens: Vec<&str> = identifier.split_whitespace().collect();

    let (verb, route_override) = match tokens.as_slice() {
        [] => return None,
        [verb, route, ..] => {
            let route = is_route_fragment(route).then(|| route.to_string());
            (*verb, route)
        }
        [single] if is_route_fragment(single) => ("get", Some(single.to_string())),
        [single] => (split_camel_case(single).into_iter().next()?, None),
    };

    let http_method = verb.parse::<HttpVerb>().ok()?;
    Some(MethodDescriptor {
        http_method,
        method_name: identifier.to_string(),
        route_override,
    })
}

/// Resolve a controller's method table into descriptors, in table order.
pub fn resolve_methods<'a, I>(identifiers: I) -> Vec<MethodDescriptor>
where
    I: IntoIterator<Item = &'a str>,
{
    identifiers
        .into_iter()
        .filter(|identifier| is_route_method(identifier))
        .filter_map(|identifier| {
            let parsed = parse_method_name(identifier);
            if parsed.is_none() {
                tracing::debug!(method = %identifier, "Skipping method without a recognized verb");
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_verb() {
        let desc = parse_method_name("get").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Get);
        assert_eq!(desc.route_override, None);
        assert_eq!(desc.method_name, "get");
    }

    #[test]
    fn test_camel_case_takes_first_fragment_only() {
        let desc = parse_method_name("getProjectsById").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Get);
        assert_eq!(desc.route_override, None);

        let desc = parse_method_name("deleteAll").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Delete);

        assert_eq!(split_camel_case("getProjectsById"), vec!["get", "Projects", "By", "Id"]);
    }

    #[test]
    fn test_verb_with_route() {
        let desc = parse_method_name("get /projects/:id").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Get);
        assert_eq!(desc.route_override.as_deref(), Some("/projects/:id"));
        assert!(!desc.is_strict());
    }

    #[test]
    fn test_verb_with_non_route_token() {
        let desc = parse_method_name("get projectsById").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Get);
        assert_eq!(desc.route_override, None);
    }

    #[test]
    fn test_bare_route_defaults_to_get() {
        let desc = parse_method_name("/projects/:id").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Get);
        assert_eq!(desc.route_override.as_deref(), Some("/projects/:id"));
    }

    #[test]
    fn test_strict_override() {
        let desc = parse_method_name("post ^/webhooks/stripe").unwrap();
        assert_eq!(desc.http_method, HttpVerb::Post);
        assert!(desc.is_strict());
    }

    #[test]
    fn test_unknown_verbs_are_rejected() {
        assert_eq!(parse_method_name("getter_helper"), None);
        assert_eq!(parse_method_name("fetch /x"), None);
        assert_eq!(parse_method_name("GET /x"), None);
        assert_eq!(parse_method_name("   "), None);
    }

    #[test]
    fn test_eligibility() {
        assert!(is_route_method("getBar"));
        assert!(is_route_method("all"));
        assert!(is_route_method("/health"));
        assert!(!is_route_method("beforeRequest"));
        assert!(!is_route_method("afterRequest"));
        assert!(!is_route_method("render"));
        assert!(!is_route_method("findUser"));
    }

    #[test]
    fn test_resolve_methods_filters_helpers() {
        let methods = resolve_methods([
            "get",
            "beforeRequest",
            "loadUser",
            "postpone",
            "post /activate",
            "afterRequest",
        ]);
        let names: Vec<_> = methods.iter().map(|m| m.method_name.as_str()).collect();
        assert_eq!(names, vec!["get", "post /activate"]);
    }
}
