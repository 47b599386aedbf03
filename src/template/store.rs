//! Template persistence interface.
//!
//! # Responsibilities
//! - Look up templates by id, optionally restricted to active ones
//! - List all active templates (route table input)
//! - Save and remove records
//! - Look up children of a record
//!
//! # Design Decisions
//! - Async trait so SQL-backed stores fit behind the same seam
//! - No ordering guarantee on `find_all_valid`; callers sort if they need to

use async_trait::async_trait;
use thiserror::Error;

use crate::template::record::{TemplateId, TemplateRecord};

/// Errors raised by template storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("template store unavailable: {0}")]
    Unavailable(String),

    #[error("path {path} is already used by template {existing}")]
    DuplicatePath { path: String, existing: TemplateId },

    #[error("template {0} not found")]
    NotFound(TemplateId),

    #[error("parent template {0} does not exist")]
    UnknownParent(TemplateId),

    #[error("setting parent of {0} would create a cycle")]
    ParentCycle(TemplateId),

    #[error("template {0} still has children")]
    HasChildren(TemplateId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent collection of page templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Find one record. With `valid_only`, inactive and unset records are ignored.
    async fn find_by_id(&self, id: TemplateId, valid_only: bool) -> StoreResult<Option<TemplateRecord>>;

    /// All records whose validity is active.
    async fn find_all_valid(&self) -> StoreResult<Vec<TemplateRecord>>;

    /// Direct children of `parent`.
    async fn find_children(&self, parent: TemplateId) -> StoreResult<Vec<TemplateRecord>>;

    /// Insert or replace a record.
    async fn save(&self, record: TemplateRecord) -> StoreResult<()>;

    /// Delete a record. Returns the removed record.
    async fn remove(&self, id: TemplateId) -> StoreResult<TemplateRecord>;
}
