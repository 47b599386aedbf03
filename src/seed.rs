//! Bulk loading of templates, models and entities from a TOML file.
//!
//! ```toml
//! [[templates]]
//! key = "products"
//! path = "/products"
//! title = "Products"
//! content = "<h1>Products</h1>"
//! valid = true
//!
//! [[templates]]
//! path = "/products/{id}"
//! title = "Product"
//! content = "<h2>{{ id }}</h2>"
//! valid = true
//! parent = "products"
//! ```
//!
//! A template's `parent` names the `key` of a template listed earlier in the file.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::render::{EntityRecord, InMemoryCatalog, ModelRecord};
use crate::template::{Actor, StoreError, TemplateId, TemplateRecord, TemplateRepository, Validity};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("template {path} references unknown parent key {parent:?}")]
    UnknownParent { path: String, parent: String },

    #[error("failed to store seeded template: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub templates: Vec<SeedTemplate>,
    pub models: Vec<ModelRecord>,
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTemplate {
    #[serde(default)]
    pub key: Option<String>,
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "Validity::unset")]
    pub valid: Validity,
    #[serde(default)]
    pub parent: Option<String>,
}

/// Counts of what a seed run stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub templates: usize,
    pub models: usize,
    pub entities: usize,
}

impl SeedFile {
    pub fn from_toml(content: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Store everything in the file. Templates go through the repository so they are
    /// normalized and audited like any other write.
    pub async fn apply(
        &self,
        repository: &TemplateRepository,
        catalog: &InMemoryCatalog,
    ) -> Result<SeedSummary, SeedError> {
        let actor = Actor::system();
        let mut keys: HashMap<&str, TemplateId> = HashMap::new();

        for seed in &self.templates {
            let mut record = TemplateRecord::new(&seed.path, &seed.title, &seed.content)
                .with_validity(seed.valid);

            if let Some(parent) = &seed.parent {
                let parent_id = keys.get(parent.as_str()).ok_or_else(|| SeedError::UnknownParent {
                    path: seed.path.clone(),
                    parent: parent.clone(),
                })?;
                record.parent = Some(*parent_id);
            }

            let stored = repository.save(record, &actor).await?;
            if let Some(key) = &seed.key {
                keys.insert(key.as_str(), stored.id);
            }
        }

        for model in &self.models {
            catalog.insert_model(model.clone());
        }
        for entity in &self.entities {
            catalog.insert_entity(entity.clone());
        }

        let summary = SeedSummary {
            templates: self.templates.len(),
            models: self.models.len(),
            entities: self.entities.len(),
        };
        tracing::info!(
            templates = summary.templates,
            models = summary.models,
            entities = summary.entities,
            "Seed data loaded"
        );
        Ok(summary)
    }
}
