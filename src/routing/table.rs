//! Route table construction.
//!
//! # Responsibilities
//! - Read all active templates from the store
//! - Compile each path into a route pattern bound to the template id
//! - Freeze the result as an immutable table
//!
//! # Design Decisions
//! - Rebuilt from scratch every time; never patched
//! - Records are registered in id order (UUID v7, so creation order); on duplicate
//!   paths the oldest record wins and later ones are skipped with a warning
//! - A record whose path does not compile is skipped; the rest of the table survives
//! - Specificity and the exact-path key are computed here, once per table
//! - Store failures are logged here and returned; callers fail closed

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;
use crate::routing::pattern::{RoutePattern, Specificity};
use crate::template::{StoreError, TemplateId, TemplateRecord, TemplateStore};

/// One route: pattern → template.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// `"<id>-<title>"`, unique within a table.
    pub name: String,
    pub pattern: RoutePattern,
    pub specificity: Specificity,
    pub template_id: TemplateId,
}

/// Paths the HTTP layer serves itself, ahead of the page catch-all.
pub(crate) const BUILTIN_PATHS: &[&str] = &[
    "/healthz",
    "/admin/status",
    "/admin/routes",
    "/admin/match",
    "/admin/cache/invalidate",
];

/// Serializable view of an entry, used by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: String,
    pub path: String,
    pub template_id: TemplateId,
}

/// Immutable routing table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    static_paths: HashMap<Vec<String>, usize>,
}

impl RouteTable {
    /// Build a table from records. Records are not filtered by validity here.
    pub fn from_records(mut records: Vec<TemplateRecord>) -> Self {
        records.sort_by_key(|r| r.id);

        let mut table = RouteTable::default();
        let mut seen_patterns: HashSet<RoutePattern> = HashSet::new();
        let mut seen_names: HashSet<String> = HashSet::new();

        for record in records {
            let pattern = match RoutePattern::parse(&record.path) {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::warn!(
                        template_id = %record.id,
                        path = %record.path,
                        error = %e,
                        "Skipping template with invalid route pattern"
                    );
                    continue;
                }
            };

            if !seen_patterns.insert(pattern.clone()) {
                tracing::warn!(
                    template_id = %record.id,
                    path = %record.path,
                    "Skipping template with duplicate path; older template wins"
                );
                continue;
            }

            let name = format!("{}-{}", record.id, record.title);
            if !seen_names.insert(name.clone()) {
                tracing::warn!(route = %name, "Skipping duplicate route name");
                continue;
            }

            if shadowed_by_builtin(&pattern) {
                tracing::warn!(
                    template_id = %record.id,
                    path = %record.path,
                    "Template path is served by a built-in route and will not be reachable"
                );
            }

            if let Some(key) = pattern.static_key() {
                table.static_paths.insert(key, table.entries.len());
            }
            table.entries.push(RouteEntry {
                name,
                specificity: pattern.specificity(),
                pattern,
                template_id: record.id,
            });
        }

        table
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry whose fully static pattern equals the decoded request segments.
    pub(crate) fn static_index(&self, segments: &[String]) -> Option<usize> {
        self.static_paths.get(segments).copied()
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.entries
            .iter()
            .map(|e| RouteSummary {
                name: e.name.clone(),
                path: e.pattern.source().to_string(),
                template_id: e.template_id,
            })
            .collect()
    }
}

pub(crate) fn shadowed_by_builtin(pattern: &RoutePattern) -> bool {
    BUILTIN_PATHS.contains(&pattern.canonical())
}

/// Builds route tables from the template store.
#[derive(Clone)]
pub struct RouteTableBuilder {
    store: Arc<dyn TemplateStore>,
}

impl RouteTableBuilder {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Build a fresh table from all active templates.
    pub async fn build(&self) -> Result<RouteTable, StoreError> {
        let started = Instant::now();

        let records = match self.store.find_all_valid().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load templates while building route table");
                metrics::record_route_table_build(false, 0, started);
                return Err(e);
            }
        };

        let loaded = records.len();
        let table = RouteTable::from_records(records);

        tracing::info!(
            templates = loaded,
            routes = table.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Route table built"
        );
        metrics::record_route_table_build(true, table.len(), started);

        Ok(table)
    }
}
