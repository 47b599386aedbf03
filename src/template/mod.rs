//! Page template records and their storage.
//!
//! # Data Flow
//! ```text
//! Editing collaborator / seed file
//!     → repository.rs (normalize, audit, parent checks)
//!     → listener.rs (left-slash path normalization)
//!     → store.rs (TemplateStore trait; memory.rs in-process impl)
//!     → invalidate TEMPLATE_TAG on every successful write
//! ```

pub mod listener;
pub mod memory;
pub mod record;
pub mod repository;
pub mod store;

/// Cache tag for anything derived from template records.
pub const TEMPLATE_TAG: &str = "template-record";

pub use memory::InMemoryTemplateStore;
pub use record::{Actor, AuditTrail, SelectItem, TemplateId, TemplateRecord, Validity};
pub use repository::TemplateRepository;
pub use store::{StoreError, StoreResult, TemplateStore};
