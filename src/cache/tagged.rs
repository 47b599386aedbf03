//! Tag-aware cache with per-key single-flight recomputation.
//!
//! # Responsibilities
//! - Hold computed values under string keys with an optional TTL
//! - Invalidate every entry carrying a tag, independent of TTL
//! - Ensure concurrent misses on one key run the computation once
//!
//! # Design Decisions
//! - Tags are versioned counters; an entry remembers the versions it was computed under
//!   and is stale as soon as any of them moves
//! - Versions are snapshotted before computing, so an invalidation that races a
//!   rebuild leaves the rebuilt entry stale rather than being lost
//! - Reads are lock-free (`ArcSwapOption`); rebuilds serialize on a per-key async mutex
//! - Failed computations are never stored

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::observability::metrics;

/// Expiry and tags applied to a freshly computed entry.
#[derive(Debug, Clone, Default)]
pub struct EntryPolicy {
    pub ttl: Option<Duration>,
    pub tags: Vec<String>,
}

impl EntryPolicy {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl, tags: Vec::new() }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Anything that can drop entries by tag. Used as the write-path hook.
pub trait TagInvalidator: Send + Sync {
    fn invalidate_tags(&self, tags: &[&str]);
}

struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Option<Instant>,
    tag_versions: Vec<(String, u64)>,
}

struct Slot<V> {
    entry: ArcSwapOption<CacheEntry<V>>,
    rebuild: Mutex<()>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            entry: ArcSwapOption::empty(),
            rebuild: Mutex::new(()),
        }
    }
}

pub struct TagAwareCache<V> {
    slots: DashMap<String, Arc<Slot<V>>>,
    tag_versions: DashMap<String, u64>,
}

impl<V> Default for TagAwareCache<V> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
            tag_versions: DashMap::new(),
        }
    }
}

impl<V> std::fmt::Debug for TagAwareCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagAwareCache")
            .field("keys", &self.slots.len())
            .field("tags", &self.tag_versions.len())
            .finish()
    }
}

impl<V: Send + Sync + 'static> TagAwareCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the fresh value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let slot = self.slots.get(key).map(|s| s.value().clone())?;
        self.fresh(&slot)
    }

    /// Return the cached value, computing and storing it on a miss.
    ///
    /// An `Err` from `compute` is handed back to the caller and nothing is cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        policy: &EntryPolicy,
        compute: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);
        if let Some(value) = self.fresh(&slot) {
            metrics::record_cache_lookup(key, true);
            return Ok(value);
        }

        let _rebuild = slot.rebuild.lock().await;
        // Another caller may have rebuilt while we waited.
        if let Some(value) = self.fresh(&slot) {
            metrics::record_cache_lookup(key, true);
            return Ok(value);
        }
        metrics::record_cache_lookup(key, false);

        let tag_versions = policy
            .tags
            .iter()
            .map(|tag| (tag.clone(), self.tag_version(tag)))
            .collect();

        let value = Arc::new(compute().await?);
        slot.entry.store(Some(Arc::new(CacheEntry {
            value: value.clone(),
            expires_at: policy.ttl.map(|ttl| Instant::now() + ttl),
            tag_versions,
        })));

        tracing::debug!(key = %key, ttl = ?policy.ttl, tags = ?policy.tags, "Cache entry stored");
        Ok(value)
    }

    /// Drop the entry stored under `key`.
    pub fn delete(&self, key: &str) {
        if let Some(slot) = self.slots.get(key) {
            slot.entry.store(None);
        }
    }

    fn slot(&self, key: &str) -> Arc<Slot<V>> {
        if let Some(slot) = self.slots.get(key) {
            return slot.value().clone();
        }
        self.slots.entry(key.to_string()).or_default().value().clone()
    }

    fn fresh(&self, slot: &Slot<V>) -> Option<Arc<V>> {
        let guard = slot.entry.load();
        let entry = (*guard).as_ref()?;

        if entry.expires_at.is_some_and(|at| Instant::now() >= at) {
            return None;
        }
        if entry
            .tag_versions
            .iter()
            .any(|(tag, version)| self.tag_version(tag) != *version)
        {
            return None;
        }
        Some(entry.value.clone())
    }

    fn tag_version(&self, tag: &str) -> u64 {
        self.tag_versions.get(tag).map(|v| *v.value()).unwrap_or(0)
    }
}

impl<V: Send + Sync + 'static> TagInvalidator for TagAwareCache<V> {
    fn invalidate_tags(&self, tags: &[&str]) {
        for tag in tags {
            *self.tag_versions.entry((*tag).to_string()).or_insert(0) += 1;
        }
        tracing::debug!(tags = ?tags, "Cache tags invalidated");
    }
}
