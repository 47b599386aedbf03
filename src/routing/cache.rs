//! Cached access to the route table.
//!
//! # Responsibilities
//! - Serve the current route table without touching the store on every request
//! - Rebuild on miss, expiry or tag invalidation
//! - Never cache a failed build
//!
//! # Design Decisions
//! - One fixed cache key, tagged with [`TEMPLATE_TAG`]
//! - TTL is an upper bound; template writes invalidate the tag immediately

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{EntryPolicy, TagAwareCache, TagInvalidator};
use crate::routing::table::{RouteTable, RouteTableBuilder};
use crate::template::TEMPLATE_TAG;

/// Cache key of the route table entry.
pub const ROUTE_CACHE_KEY: &str = "cms-template-routes";

/// Default upper bound on the age of a cached table.
pub const DEFAULT_ROUTE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Clone)]
pub struct RouteCache {
    builder: RouteTableBuilder,
    cache: Arc<TagAwareCache<RouteTable>>,
    policy: EntryPolicy,
}

impl RouteCache {
    pub fn new(builder: RouteTableBuilder, cache: Arc<TagAwareCache<RouteTable>>, ttl: Duration) -> Self {
        Self {
            builder,
            cache,
            policy: EntryPolicy::new(Some(ttl)).tag(TEMPLATE_TAG),
        }
    }

    /// The current table, or `None` when it cannot be built.
    pub async fn table(&self) -> Option<Arc<RouteTable>> {
        self.cache
            .get_or_compute(ROUTE_CACHE_KEY, &self.policy, || self.builder.build())
            .await
            .ok()
    }

    /// Drop the cached table so the next lookup rebuilds it.
    pub fn invalidate(&self) {
        self.cache.invalidate_tags(&[TEMPLATE_TAG]);
    }

    /// The underlying cache, for wiring write-path invalidation.
    pub fn invalidator(&self) -> Arc<dyn TagInvalidator> {
        self.cache.clone()
    }
}
