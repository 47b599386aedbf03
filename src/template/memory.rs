//! In-process template store.
//!
//! Records live in a concurrent map keyed by id; a second map indexes paths so that
//! path uniqueness is enforced atomically per path.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::template::record::{TemplateId, TemplateRecord};
use crate::template::store::{StoreError, StoreResult, TemplateStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    records: Arc<DashMap<TemplateId, TemplateRecord>>,
    paths: Arc<DashMap<String, TemplateId>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn find_by_id(&self, id: TemplateId, valid_only: bool) -> StoreResult<Option<TemplateRecord>> {
        Ok(self
            .records
            .get(&id)
            .map(|r| r.value().clone())
            .filter(|record| !valid_only || record.is_routable()))
    }

    async fn find_all_valid(&self) -> StoreResult<Vec<TemplateRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.value().is_routable())
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_children(&self, parent: TemplateId) -> StoreResult<Vec<TemplateRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.value().parent == Some(parent))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn save(&self, record: TemplateRecord) -> StoreResult<()> {
        let previous_path = self.records.get(&record.id).map(|r| r.path.clone());

        match self.paths.entry(record.path.clone()) {
            Entry::Occupied(entry) if *entry.get() != record.id => {
                return Err(StoreError::DuplicatePath {
                    path: record.path.clone(),
                    existing: *entry.get(),
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(record.id);
            }
        }

        if let Some(old) = previous_path.filter(|old| *old != record.path) {
            self.paths.remove_if(&old, |_, owner| *owner == record.id);
        }

        self.records.insert(record.id, record);
        Ok(())
    }

    async fn remove(&self, id: TemplateId) -> StoreResult<TemplateRecord> {
        if self.records.iter().any(|r| r.value().parent == Some(id)) {
            return Err(StoreError::HasChildren(id));
        }

        let (_, record) = self.records.remove(&id).ok_or(StoreError::NotFound(id))?;
        self.paths.remove_if(&record.path, |_, owner| *owner == id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::record::Validity;

    #[tokio::test]
    async fn test_find_all_valid_skips_inactive_and_unset() {
        let store = InMemoryTemplateStore::new();
        store.save(TemplateRecord::new("/a", "A", "").with_validity(true)).await.unwrap();
        store.save(TemplateRecord::new("/b", "B", "").with_validity(false)).await.unwrap();
        store.save(TemplateRecord::new("/c", "C", "").with_validity(Validity::Unset)).await.unwrap();

        let valid = store.find_all_valid().await.unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].path, "/a");
    }

    #[tokio::test]
    async fn test_find_by_id_valid_only() {
        let store = InMemoryTemplateStore::new();
        let record = TemplateRecord::new("/a", "A", "");
        let id = record.id;
        store.save(record).await.unwrap();

        assert!(store.find_by_id(id, false).await.unwrap().is_some());
        assert!(store.find_by_id(id, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_path_rejected() {
        let store = InMemoryTemplateStore::new();
        let first = TemplateRecord::new("/same", "One", "");
        let first_id = first.id;
        store.save(first).await.unwrap();

        let err = store.save(TemplateRecord::new("/same", "Two", "")).await.unwrap_err();
        match err {
            StoreError::DuplicatePath { existing, .. } => assert_eq!(existing, first_id),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_path_change_releases_old_path() {
        let store = InMemoryTemplateStore::new();
        let mut record = TemplateRecord::new("/old", "Page", "");
        store.save(record.clone()).await.unwrap();

        record.path = "/new".to_string();
        store.save(record).await.unwrap();

        store.save(TemplateRecord::new("/old", "Other", "")).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_and_children() {
        let store = InMemoryTemplateStore::new();
        let parent = TemplateRecord::new("/products", "Products", "");
        let parent_id = parent.id;
        let child = TemplateRecord::new("/products/detail", "Detail", "").with_parent(parent_id);
        let child_id = child.id;
        store.save(parent).await.unwrap();
        store.save(child).await.unwrap();

        let children = store.find_children(parent_id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child_id);

        assert!(matches!(store.remove(parent_id).await, Err(StoreError::HasChildren(_))));
        store.remove(child_id).await.unwrap();
        store.remove(parent_id).await.unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.remove(parent_id).await, Err(StoreError::NotFound(_))));
    }
}
