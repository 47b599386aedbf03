//! Routing condition gate.
//!
//! # Responsibilities
//! - Decide, per request, whether a stored template serves the path
//! - Copy matched parameters into the request attributes
//!
//! # Design Decisions
//! - Cheap per request: the store is only read when the cached table is missing
//! - Existing request attributes always win over matched parameters
//! - Every failure (store down, no match) is a plain "not routable"

use crate::observability::metrics;
use crate::routing::attributes::RequestAttributes;
use crate::routing::cache::RouteCache;
use crate::routing::matcher::{match_path, normalize_request_path, MatchResult, RouteMatch};

#[derive(Clone)]
pub struct RoutingCondition {
    routes: RouteCache,
}

impl RoutingCondition {
    pub fn new(routes: RouteCache) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteCache {
        &self.routes
    }

    /// Returns true if a template serves `request_path`, writing matched parameters
    /// into `attributes` for keys that are not already present.
    pub async fn check(&self, request_path: &str, attributes: &mut RequestAttributes) -> bool {
        let Some(route) = self.resolve(request_path).await else {
            metrics::record_gate_outcome("no_match");
            return false;
        };

        if route.params.is_empty() {
            tracing::warn!(route = %route.route_name, "Route matched without parameters");
            metrics::record_gate_outcome("no_match");
            return false;
        }

        for (key, value) in route.params {
            attributes.set_if_absent(key, value);
        }

        tracing::debug!(
            path = %request_path,
            route = %route.route_name,
            template_id = %route.template_id,
            "Template route matched"
        );
        metrics::record_gate_outcome("matched");
        true
    }

    /// Look up the route for a path without touching any request state.
    pub async fn resolve(&self, request_path: &str) -> Option<RouteMatch> {
        let Some(table) = self.routes.table().await else {
            tracing::debug!(path = %request_path, "Route table unavailable; declining request");
            return None;
        };

        let path = normalize_request_path(request_path);
        match match_path(&table, &path) {
            MatchResult::Matched(route) => Some(route),
            MatchResult::NoMatch => None,
        }
    }
}
