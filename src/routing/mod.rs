//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → condition.rs (gate: normalize, fetch table, match)
//!     → cache.rs (cached table, rebuilt on miss / TTL / tag invalidation)
//!     → table.rs (build from active templates in the store)
//!     → matcher.rs (most specific entry, extract parameters)
//!     → Return: RouteMatch written into RequestAttributes, or not routable
//!
//! Route Compilation (on cache miss):
//!     TemplateRecord[] (active only)
//!     → Sort by id (oldest first)
//!     → Compile patterns (static / {param} / {*catch_all})
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once built; a rebuild replaces the whole table
//! - Static paths resolve through a hash lookup, patterns through a linear scan
//! - Deterministic: same table and path always yield the same match
//! - Explicit NoMatch rather than silent default

pub mod attributes;
pub mod cache;
pub mod condition;
pub mod matcher;
pub mod pattern;
pub mod table;

/// Attribute key under which a matched route binds its template id.
pub const TEMPLATE_KEY: &str = "_cms_template_id";

pub use attributes::RequestAttributes;
pub use cache::{RouteCache, DEFAULT_ROUTE_TTL, ROUTE_CACHE_KEY};
pub use condition::RoutingCondition;
pub use matcher::{match_path, normalize_request_path, MatchResult, RouteMatch};
pub use pattern::{PatternError, RoutePattern};
pub use table::{RouteEntry, RouteSummary, RouteTable, RouteTableBuilder};
