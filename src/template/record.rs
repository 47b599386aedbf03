//! Page template records.
//!
//! # Responsibilities
//! - Define the stored shape of a page template
//! - Provide the time-ordered template identifier
//! - Model the tri-state validity flag explicitly
//!
//! # Design Decisions
//! - Parent is an id reference, children are looked up by index (no back-collection)
//! - Identifiers are UUID v7, so sorting by id sorts by creation time
//! - Only `Validity::Active` is routable; `Inactive` and `Unset` behave alike for routing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque, time-ordered template identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(Uuid);

impl TemplateId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TemplateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for TemplateId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Tri-state validity flag.
///
/// Serialized as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Validity {
    Active,
    #[default]
    Inactive,
    Unset,
}

impl Validity {
    /// Returns true if records with this flag may be routed and rendered.
    pub fn is_active(self) -> bool {
        matches!(self, Validity::Active)
    }

    /// Value for a record that carries no flag at all.
    pub fn unset() -> Self {
        Validity::Unset
    }
}

impl From<Option<bool>> for Validity {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Validity::Active,
            Some(false) => Validity::Inactive,
            None => Validity::Unset,
        }
    }
}

impl From<Validity> for Option<bool> {
    fn from(value: Validity) -> Self {
        match value {
            Validity::Active => Some(true),
            Validity::Inactive => Some(false),
            Validity::Unset => None,
        }
    }
}

impl From<bool> for Validity {
    fn from(value: bool) -> Self {
        Some(value).into()
    }
}

/// Who changed a record, from where, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditTrail {
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_from_ip: Option<String>,
    pub updated_from_ip: Option<String>,
    /// Seconds since the unix epoch.
    pub create_time: Option<u64>,
    /// Seconds since the unix epoch.
    pub update_time: Option<u64>,
}

impl AuditTrail {
    /// Stamp a write performed by `actor`. Creation fields are only set once.
    pub fn stamp(&mut self, actor: &Actor) {
        let now = unix_now();
        if self.create_time.is_none() {
            self.create_time = Some(now);
            self.created_by = actor.user.clone();
            self.created_from_ip = actor.ip.clone();
        }
        self.update_time = Some(now);
        self.updated_by = actor.user.clone();
        self.updated_from_ip = actor.ip.clone();
    }
}

/// The user and client address behind a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub user: Option<String>,
    pub ip: Option<String>,
}

impl Actor {
    pub fn new(user: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ip: Some(ip.into()),
        }
    }

    /// Writes made by the service itself (seeding, tooling).
    pub fn system() -> Self {
        Self {
            user: Some("system".to_string()),
            ip: None,
        }
    }
}

/// A stored, path-addressable page template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: TemplateId,
    pub path: String,
    pub title: String,
    pub content: String,
    #[serde(default = "Validity::unset")]
    pub valid: Validity,
    #[serde(default)]
    pub parent: Option<TemplateId>,
    #[serde(default)]
    pub audit: AuditTrail,
}

/// Picker entry for selecting a template in editing tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectItem {
    pub id: TemplateId,
    pub text: String,
}

const PREVIEW_CHARS: usize = 50;

impl TemplateRecord {
    /// Create a new, inactive record with a fresh identifier.
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: TemplateId::generate(),
            path: path.into(),
            title: title.into(),
            content: content.into(),
            valid: Validity::Inactive,
            parent: None,
            audit: AuditTrail::default(),
        }
    }

    pub fn with_validity(mut self, valid: impl Into<Validity>) -> Self {
        self.valid = valid.into();
        self
    }

    pub fn with_parent(mut self, parent: TemplateId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn is_routable(&self) -> bool {
        self.valid.is_active()
    }

    pub fn select_item(&self) -> SelectItem {
        SelectItem {
            id: self.id,
            text: format!("{}({})", self.title, self.path),
        }
    }

    /// Markup-free excerpt of the content.
    pub fn content_preview(&self) -> String {
        if self.content.is_empty() {
            return "(no content)".to_string();
        }

        let text = strip_tags(&self.content);
        if text.chars().count() > PREVIEW_CHARS {
            let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
            preview.push_str("...");
            preview
        } else {
            text
        }
    }
}

impl fmt::Display for TemplateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_time_ordered() {
        let first = TemplateId::generate();
        let second = TemplateId::generate();
        assert!(first < second);

        let parsed: TemplateId = first.to_string().parse().unwrap();
        assert_eq!(parsed, first);
    }

    #[test]
    fn test_validity_tri_state() {
        assert_eq!(Validity::from(Some(true)), Validity::Active);
        assert_eq!(Validity::from(Some(false)), Validity::Inactive);
        assert_eq!(Validity::from(None), Validity::Unset);
        assert!(Validity::Active.is_active());
        assert!(!Validity::Inactive.is_active());
        assert!(!Validity::Unset.is_active());

        assert_eq!(serde_json::to_string(&Validity::Unset).unwrap(), "null");
        let v: Validity = serde_json::from_str("true").unwrap();
        assert_eq!(v, Validity::Active);
    }

    #[test]
    fn test_missing_valid_field_is_unset() {
        let record = TemplateRecord::new("/a", "A", "").with_validity(true);
        let mut json = serde_json::to_value(&record).unwrap();
        json.as_object_mut().unwrap().remove("valid");

        let parsed: TemplateRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.valid, Validity::Unset);
    }

    #[test]
    fn test_select_item_and_display() {
        let record = TemplateRecord::new("/about", "About us", "<h1>About</h1>");
        assert_eq!(record.select_item().text, "About us(/about)");
        assert_eq!(record.to_string(), "About us");
    }

    #[test]
    fn test_content_preview() {
        let record = TemplateRecord::new("/", "Home", "<h1>Welcome</h1><p>home page</p>");
        assert_eq!(record.content_preview(), "Welcomehome page");

        let empty = TemplateRecord::new("/", "Home", "");
        assert_eq!(empty.content_preview(), "(no content)");

        let long = TemplateRecord::new("/", "Home", "x".repeat(80));
        let preview = long.content_preview();
        assert_eq!(preview.len(), 53);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_audit_stamp_keeps_creator() {
        let mut audit = AuditTrail::default();
        audit.stamp(&Actor::new("alice", "10.0.0.1"));
        audit.stamp(&Actor::new("bob", "10.0.0.2"));

        assert_eq!(audit.created_by.as_deref(), Some("alice"));
        assert_eq!(audit.created_from_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(audit.updated_by.as_deref(), Some("bob"));
        assert_eq!(audit.updated_from_ip.as_deref(), Some("10.0.0.2"));
        assert!(audit.update_time >= audit.create_time);
    }
}
