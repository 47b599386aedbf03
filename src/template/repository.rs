//! Write path for template records.
//!
//! # Responsibilities
//! - Normalize paths on every create and update
//! - Stamp audit fields
//! - Refuse unknown parents and parent cycles
//! - Invalidate everything tagged with [`TEMPLATE_TAG`] after each successful write
//!
//! # Design Decisions
//! - Invalidation hooks are injected, the repository does not know about routing
//! - Hooks run only after the store accepted the write

use std::sync::Arc;

use crate::cache::TagInvalidator;
use crate::template::listener;
use crate::template::record::{Actor, TemplateId, TemplateRecord, Validity};
use crate::template::store::{StoreError, StoreResult, TemplateStore};
use crate::template::TEMPLATE_TAG;

/// Longest parent chain walked before a chain is treated as cyclic.
const MAX_ANCESTRY_DEPTH: usize = 256;

#[derive(Clone)]
pub struct TemplateRepository {
    store: Arc<dyn TemplateStore>,
    invalidators: Vec<Arc<dyn TagInvalidator>>,
}

impl TemplateRepository {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self {
            store,
            invalidators: Vec::new(),
        }
    }

    /// Register a cache to be invalidated after every write.
    pub fn with_invalidator(mut self, invalidator: Arc<dyn TagInvalidator>) -> Self {
        self.invalidators.push(invalidator);
        self
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    pub async fn find(&self, id: TemplateId, valid_only: bool) -> StoreResult<Option<TemplateRecord>> {
        self.store.find_by_id(id, valid_only).await
    }

    pub async fn children(&self, parent: TemplateId) -> StoreResult<Vec<TemplateRecord>> {
        self.store.find_children(parent).await
    }

    /// Create or update a record. Returns the record as stored.
    pub async fn save(&self, mut record: TemplateRecord, actor: &Actor) -> StoreResult<TemplateRecord> {
        listener::before_write(&mut record);
        self.check_parent(&record).await?;
        record.audit.stamp(actor);

        self.store.save(record.clone()).await?;
        tracing::info!(
            template_id = %record.id,
            path = %record.path,
            valid = ?record.valid,
            "Template saved"
        );
        self.notify();
        Ok(record)
    }

    /// Flip the validity flag of an existing record.
    pub async fn set_validity(
        &self,
        id: TemplateId,
        valid: Validity,
        actor: &Actor,
    ) -> StoreResult<TemplateRecord> {
        let mut record = self
            .store
            .find_by_id(id, false)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        record.valid = valid;
        self.save(record, actor).await
    }

    pub async fn remove(&self, id: TemplateId) -> StoreResult<TemplateRecord> {
        let record = self.store.remove(id).await?;
        tracing::info!(template_id = %id, path = %record.path, "Template removed");
        self.notify();
        Ok(record)
    }

    async fn check_parent(&self, record: &TemplateRecord) -> StoreResult<()> {
        let mut current = record.parent;
        let mut depth = 0;

        while let Some(parent_id) = current {
            if parent_id == record.id || depth >= MAX_ANCESTRY_DEPTH {
                return Err(StoreError::ParentCycle(record.id));
            }
            let parent = self
                .store
                .find_by_id(parent_id, false)
                .await?
                .ok_or(StoreError::UnknownParent(parent_id))?;
            current = parent.parent;
            depth += 1;
        }
        Ok(())
    }

    fn notify(&self) {
        for invalidator in &self.invalidators {
            invalidator.invalidate_tags(&[TEMPLATE_TAG]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::InMemoryTemplateStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInvalidator {
        calls: AtomicUsize,
        tags: Mutex<Vec<String>>,
    }

    impl TagInvalidator for RecordingInvalidator {
        fn invalidate_tags(&self, tags: &[&str]) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut seen = self.tags.lock().unwrap();
            seen.extend(tags.iter().map(|t| t.to_string()));
        }
    }

    fn repository() -> (TemplateRepository, Arc<RecordingInvalidator>) {
        let invalidator = Arc::new(RecordingInvalidator::default());
        let repo = TemplateRepository::new(Arc::new(InMemoryTemplateStore::new()))
            .with_invalidator(invalidator.clone());
        (repo, invalidator)
    }

    #[tokio::test]
    async fn test_save_normalizes_path_on_create_and_update() {
        let (repo, _) = repository();
        let actor = Actor::system();

        let mut saved = repo.save(TemplateRecord::new("test/path", "T", ""), &actor).await.unwrap();
        assert_eq!(saved.path, "/test/path");

        saved.path = "  other  ".to_string();
        let updated = repo.save(saved, &actor).await.unwrap();
        assert_eq!(updated.path, "/other");
    }

    #[tokio::test]
    async fn test_writes_invalidate_template_tag() {
        let (repo, invalidator) = repository();
        let actor = Actor::new("editor", "127.0.0.1");

        let saved = repo.save(TemplateRecord::new("/a", "A", ""), &actor).await.unwrap();
        repo.set_validity(saved.id, Validity::Active, &actor).await.unwrap();
        repo.remove(saved.id).await.unwrap();

        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 3);
        assert!(invalidator.tags.lock().unwrap().iter().all(|t| t == TEMPLATE_TAG));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_invalidate() {
        let (repo, invalidator) = repository();
        let actor = Actor::system();

        repo.save(TemplateRecord::new("/a", "A", ""), &actor).await.unwrap();
        let duplicate = repo.save(TemplateRecord::new("a", "B", ""), &actor).await;

        assert!(matches!(duplicate, Err(StoreError::DuplicatePath { .. })));
        assert_eq!(invalidator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parent_cycle_rejected() {
        let (repo, _) = repository();
        let actor = Actor::system();

        let root = repo.save(TemplateRecord::new("/root", "Root", ""), &actor).await.unwrap();
        let child = repo
            .save(TemplateRecord::new("/root/child", "Child", "").with_parent(root.id), &actor)
            .await
            .unwrap();

        let mut looped = root.clone();
        looped.parent = Some(child.id);
        assert!(matches!(repo.save(looped, &actor).await, Err(StoreError::ParentCycle(_))));

        let mut own = root;
        own.parent = Some(own.id);
        assert!(matches!(repo.save(own, &actor).await, Err(StoreError::ParentCycle(_))));

        assert_eq!(repo.children(child.parent.unwrap()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_parent_rejected() {
        let (repo, _) = repository();
        let orphan = TemplateRecord::new("/x", "X", "").with_parent(TemplateId::generate());
        assert!(matches!(
            repo.save(orphan, &Actor::system()).await,
            Err(StoreError::UnknownParent(_))
        ));
    }

    #[tokio::test]
    async fn test_audit_fields_stamped() {
        let (repo, _) = repository();
        let saved = repo
            .save(TemplateRecord::new("/a", "A", ""), &Actor::new("alice", "10.1.1.1"))
            .await
            .unwrap();
        assert_eq!(saved.audit.created_by.as_deref(), Some("alice"));
        assert!(saved.audit.create_time.is_some());
    }
}
