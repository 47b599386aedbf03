//! Caching subsystem.
//!
//! # Data Flow
//! ```text
//! get_or_compute(key, policy, compute)
//!     → fresh entry? (TTL not passed, tag versions unchanged) → return
//!     → lock key → re-check → compute → store with tag snapshot
//!
//! Write path (template saved/removed):
//!     → invalidate_tags(["template-record"])
//!     → every entry tagged with it becomes stale
//! ```

pub mod tagged;

pub use tagged::{EntryPolicy, TagAwareCache, TagInvalidator};
