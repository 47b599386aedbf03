//! Model and entity lookups used to build the render context.
//!
//! Both are external collaborators; the in-memory catalog backs the server binary and
//! the tests.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("lookup failed: {0}")]
pub struct LookupError(pub String);

/// A content model ("product", "article", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_true")]
    pub valid: bool,
}

/// A content entity, optionally belonging to a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub model: Option<ModelRecord>,
    #[serde(default)]
    pub values: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

#[async_trait]
pub trait ModelRepository: Send + Sync {
    async fn find_valid_model_by_code(&self, code: &str) -> Result<Option<ModelRecord>, LookupError>;

    async fn find_valid_model_by_id(&self, id: &str) -> Result<Option<ModelRecord>, LookupError>;
}

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn find_entity_by_id(&self, id: &str) -> Result<Option<EntityRecord>, LookupError>;
}

/// In-process models and entities.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    models: Arc<DashMap<String, ModelRecord>>,
    entities: Arc<DashMap<String, EntityRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_model(&self, model: ModelRecord) {
        self.models.insert(model.id.clone(), model);
    }

    pub fn insert_entity(&self, entity: EntityRecord) {
        self.entities.insert(entity.id.clone(), entity);
    }
}

#[async_trait]
impl ModelRepository for InMemoryCatalog {
    async fn find_valid_model_by_code(&self, code: &str) -> Result<Option<ModelRecord>, LookupError> {
        Ok(self
            .models
            .iter()
            .find(|m| m.value().valid && m.value().code == code)
            .map(|m| m.value().clone()))
    }

    async fn find_valid_model_by_id(&self, id: &str) -> Result<Option<ModelRecord>, LookupError> {
        Ok(self
            .models
            .get(id)
            .map(|m| m.value().clone())
            .filter(|m| m.valid))
    }
}

#[async_trait]
impl EntityRepository for InMemoryCatalog {
    async fn find_entity_by_id(&self, id: &str) -> Result<Option<EntityRecord>, LookupError> {
        Ok(self.entities.get(id).map(|e| e.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str, code: &str, valid: bool) -> ModelRecord {
        ModelRecord {
            id: id.to_string(),
            code: code.to_string(),
            title: code.to_string(),
            valid,
        }
    }

    #[tokio::test]
    async fn test_only_valid_models_found() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_model(model("1", "product", true));
        catalog.insert_model(model("2", "retired", false));

        assert!(catalog.find_valid_model_by_code("product").await.unwrap().is_some());
        assert!(catalog.find_valid_model_by_code("retired").await.unwrap().is_none());
        assert!(catalog.find_valid_model_by_id("1").await.unwrap().is_some());
        assert!(catalog.find_valid_model_by_id("2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entity_lookup() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_entity(EntityRecord {
            id: "e1".to_string(),
            title: "Widget".to_string(),
            model: Some(model("1", "product", true)),
            values: Map::new(),
        });

        let entity = catalog.find_entity_by_id("e1").await.unwrap().unwrap();
        assert_eq!(entity.model.unwrap().code, "product");
        assert!(catalog.find_entity_by_id("nope").await.unwrap().is_none());
    }
}
