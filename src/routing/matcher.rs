//! Route matching logic.
//!
//! # Responsibilities
//! - Normalize request paths to the canonical form used for matching
//! - Find the entry of a route table matching a normalized path
//! - Extract placeholder and catch-all parameters
//!
//! # Design Decisions
//! - Fully static patterns are looked up in an exact-path index first
//! - Otherwise every entry is tried; the most specific match wins and ties keep
//!   table order (first registered wins)
//! - No match is an explicit outcome, never an error

use serde::Serialize;
use std::collections::BTreeMap;

use crate::routing::pattern::decode_segments;
use crate::routing::table::RouteTable;
use crate::routing::TEMPLATE_KEY;
use crate::template::TemplateId;

/// Canonical request path: one leading slash, no trailing slash, no `//` anywhere.
///
/// `""` and `"/"` become `"/"`; `"//test/path/"` becomes `"/test/path"`.
pub fn normalize_request_path(path: &str) -> String {
    let mut normalized = format!("/{}", path.trim_matches('/'));
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized
}

/// A successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub template_id: TemplateId,
    pub route_name: String,
    /// The bound template id under [`TEMPLATE_KEY`] plus every captured parameter.
    pub params: BTreeMap<String, String>,
}

/// Outcome of matching a path against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched(RouteMatch),
    NoMatch,
}

impl MatchResult {
    pub fn into_option(self) -> Option<RouteMatch> {
        match self {
            MatchResult::Matched(m) => Some(m),
            MatchResult::NoMatch => None,
        }
    }
}

/// Match a normalized path against the table.
///
/// Callers normalize with [`normalize_request_path`] first.
pub fn match_path(table: &RouteTable, normalized_path: &str) -> MatchResult {
    if table.is_empty() {
        return MatchResult::NoMatch;
    }

    let segments = decode_segments(normalized_path);
    if let Some(index) = table.static_index(&segments) {
        return MatchResult::Matched(build_match(table, index, Vec::new()));
    }

    let mut best: Option<(usize, Vec<(String, String)>)> = None;

    for (index, entry) in table.entries().iter().enumerate() {
        let Some(captures) = entry.pattern.captures(&segments) else {
            continue;
        };

        let better = match &best {
            None => true,
            Some((best_index, _)) => {
                entry.specificity > table.entries()[*best_index].specificity
            }
        };
        if better {
            best = Some((index, captures));
        }
    }

    match best {
        Some((index, captures)) => MatchResult::Matched(build_match(table, index, captures)),
        None => MatchResult::NoMatch,
    }
}

fn build_match(table: &RouteTable, index: usize, captures: Vec<(String, String)>) -> RouteMatch {
    let entry = &table.entries()[index];
    let mut params: BTreeMap<String, String> = captures.into_iter().collect();
    params.insert(TEMPLATE_KEY.to_string(), entry.template_id.to_string());

    RouteMatch {
        template_id: entry.template_id,
        route_name: entry.name.clone(),
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::RouteTable;
    use crate::template::TemplateRecord;

    fn table(paths: &[&str]) -> (RouteTable, Vec<TemplateId>) {
        let records: Vec<TemplateRecord> = paths
            .iter()
            .map(|p| TemplateRecord::new(*p, format!("page {p}"), "").with_validity(true))
            .collect();
        let ids = records.iter().map(|r| r.id).collect();
        (RouteTable::from_records(records), ids)
    }

    fn matched(table: &RouteTable, path: &str) -> Option<RouteMatch> {
        match_path(table, &normalize_request_path(path)).into_option()
    }

    #[test]
    fn test_normalize_request_path() {
        assert_eq!(normalize_request_path(""), "/");
        assert_eq!(normalize_request_path("/"), "/");
        assert_eq!(normalize_request_path("///"), "/");
        assert_eq!(normalize_request_path("test/path"), "/test/path");
        assert_eq!(normalize_request_path("//test/path"), "/test/path");
        assert_eq!(normalize_request_path("/test//path/"), "/test/path");
        assert_eq!(normalize_request_path("/a///b////c"), "/a/b/c");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["", "/", "a//b/", "//x", "/a/{id}/"] {
            let once = normalize_request_path(input);
            assert_eq!(normalize_request_path(&once), once);
        }
    }

    #[test]
    fn test_exact_path_resolves_to_its_record() {
        let (table, ids) = table(&["/", "/about", "/contact"]);
        for (path, id) in ["/", "/about", "/contact"].iter().zip(ids) {
            let m = matched(&table, path).unwrap();
            assert_eq!(m.template_id, id);
            assert_eq!(m.params.get(TEMPLATE_KEY), Some(&id.to_string()));
        }
        assert!(matched(&table, "/missing").is_none());
    }

    #[test]
    fn test_placeholder_params_extracted() {
        let (table, ids) = table(&["/products/{id}"]);
        let m = matched(&table, "/products/42").unwrap();
        assert_eq!(m.template_id, ids[0]);
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(m.params.len(), 2);
    }

    #[test]
    fn test_most_specific_wins() {
        let (table, ids) = table(&["/{*path}", "/products/{id}", "/products/new"]);

        assert_eq!(matched(&table, "/products/new").unwrap().template_id, ids[2]);
        assert_eq!(matched(&table, "/products/7").unwrap().template_id, ids[1]);

        let fallback = matched(&table, "/blog/2024/hello").unwrap();
        assert_eq!(fallback.template_id, ids[0]);
        assert_eq!(fallback.params.get("path").map(String::as_str), Some("blog/2024/hello"));
    }

    #[test]
    fn test_empty_table_never_matches() {
        let table = RouteTable::default();
        assert_eq!(match_path(&table, "/"), MatchResult::NoMatch);
    }

    #[test]
    fn test_percent_encoded_request_paths() {
        let (table, ids) = table(&["/关于", "/about us", "/a/b"]);
        assert_eq!(matched(&table, "/%E5%85%B3%E4%BA%8E").unwrap().template_id, ids[0]);
        assert_eq!(matched(&table, "/about%20us").unwrap().template_id, ids[1]);
        assert!(matched(&table, "/a%2Fb").is_none());
    }

    #[test]
    fn test_double_slash_request_matches() {
        let (table, ids) = table(&["/test/path"]);
        assert_eq!(matched(&table, "//test//path/").unwrap().template_id, ids[0]);
    }
}
