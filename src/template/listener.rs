//! Write-time hooks for template records.
//!
//! Runs on every create and every update, before the record reaches the store.

use crate::template::record::TemplateRecord;

/// Ensure the stored path starts with a slash.
///
/// Whitespace is trimmed first. A path that already starts with `/` is left as is,
/// so `//x` is not collapsed here.
pub fn ensure_path_has_left_slash(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Apply all write-time normalization to a record.
pub fn before_write(record: &mut TemplateRecord) {
    record.path = ensure_path_has_left_slash(&record.path);
}
