//! Route lookup and route classification.
//!
//! # Responsibilities
//! - Store compiled routes, highest priority first
//! - Look up the route for a request path
//! - Classify a path into a rate-limit route class
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Ties on priority go to the longer prefix
//! - Unmatched paths classify as "default"

use std::net::SocketAddr;

use serde::Serialize;

use crate::config::RouteConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// Route class for paths no route claims.
pub const DEFAULT_ROUTE_CLASS: &str = "default";

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub upstream: SocketAddr,
    pub priority: u32,
    matcher: PathPrefixMatcher,
}

impl Route {
    pub fn path_prefix(&self) -> &str {
        self.matcher.prefix()
    }
}

/// Serializable view of a route for the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub path_prefix: String,
    pub upstream: String,
    pub priority: u32,
}

/// Immutable routing table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Compile routes from configuration, skipping entries with a bad upstream.
    pub fn from_config(configs: Vec<RouteConfig>) -> Self {
        let mut routes: Vec<Route> = configs
            .into_iter()
            .filter_map(|config| match config.upstream.parse() {
                Ok(upstream) => Some(Route {
                    name: config.name,
                    upstream,
                    priority: config.priority,
                    matcher: PathPrefixMatcher::new(config.path_prefix),
                }),
                Err(_) => {
                    tracing::warn!(route = %config.name, upstream = %config.upstream, "Invalid upstream address, route skipped");
                    None
                }
            })
            .collect();

        routes.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.path_prefix().len().cmp(&a.path_prefix().len()))
        });

        Self { routes }
    }

    /// First route whose prefix matches `path`.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(path))
    }

    /// Rate-limit bucket for `path`: the matching route's name, or "default".
    pub fn route_class<'a>(&'a self, path: &str) -> &'a str {
        self.match_path(path)
            .map(|r| r.name.as_str())
            .unwrap_or(DEFAULT_ROUTE_CLASS)
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|r| RouteSummary {
                name: r.name.clone(),
                path_prefix: r.path_prefix().to_string(),
                upstream: r.upstream.to_string(),
                priority: r.priority,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    fn route(name: &str, prefix: &str, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            path_prefix: prefix.to_string(),
            upstream: "127.0.0.1:9000".to_string(),
            priority,
        }
    }

    #[test]
    fn test_default_route_classes() {
        let router = Router::from_config(GatewayConfig::default_routes());

        assert_eq!(router.route_class("/api/orders/123"), "order-service");
        assert_eq!(router.route_class("/api/auth/login"), "auth-service");
        assert_eq!(router.route_class("/api/products"), DEFAULT_ROUTE_CLASS);
    }

    #[test]
    fn test_priority_then_longest_prefix() {
        let router = Router::from_config(vec![
            route("catch-all", "/", 0),
            route("api", "/api", 5),
            route("api-v2", "/api/v2", 5),
        ]);

        assert_eq!(router.route_class("/api/v2/items"), "api-v2");
        assert_eq!(router.route_class("/api/v1/items"), "api");
        assert_eq!(router.route_class("/static/app.js"), "catch-all");
    }

    #[test]
    fn test_invalid_upstream_skipped() {
        let mut bad = route("bad", "/bad", 0);
        bad.upstream = "nowhere".to_string();
        let router = Router::from_config(vec![bad, route("good", "/good", 0)]);

        assert_eq!(router.len(), 1);
        assert!(router.match_path("/bad").is_none());
    }
}
