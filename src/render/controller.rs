//! Render entry point.
//!
//! # Responsibilities
//! - Re-load the template chosen by the routing gate (active only)
//! - Resolve the optional model and entity
//! - Render the template content against the merged context
//!
//! # Design Decisions
//! - The template is read again at render time: it may have been deactivated since the
//!   route table was built
//! - Model/entity lookup failures are logged and treated as absent
//! - Nothing is cached; every request renders from stored content

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::observability::metrics;
use crate::render::engine::{EngineError, TemplateEngine};
use crate::render::resolver::{EntityRecord, EntityRepository, ModelRecord, ModelRepository};
use crate::routing::{normalize_request_path, RequestAttributes, TEMPLATE_KEY};
use crate::template::{TemplateId, TemplateStore};

pub const MODEL_CODE_KEY: &str = "model_code";
pub const MODEL_ID_KEY: &str = "model_id";
pub const ENTITY_ID_KEY: &str = "entity_id";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template lookup failed")]
    TemplateNotFound,

    #[error("template rendering failed: {0}")]
    Engine(#[from] EngineError),
}

#[derive(Clone)]
pub struct RenderController {
    templates: Arc<dyn TemplateStore>,
    models: Arc<dyn ModelRepository>,
    entities: Arc<dyn EntityRepository>,
    engine: Arc<dyn TemplateEngine>,
}

impl RenderController {
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        models: Arc<dyn ModelRepository>,
        entities: Arc<dyn EntityRepository>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            templates,
            models,
            entities,
            engine,
        }
    }

    /// Render the template bound in `attributes` for `request_path`.
    pub async fn render(&self, request_path: &str, attributes: &RequestAttributes) -> Result<String, RenderError> {
        let started = Instant::now();
        let template_id = attributes
            .get_str(TEMPLATE_KEY)
            .and_then(|raw| raw.parse::<TemplateId>().ok())
            .ok_or(RenderError::TemplateNotFound)?;

        let template = match self.templates.find_by_id(template_id, true).await {
            Ok(Some(template)) => template,
            Ok(None) => {
                tracing::info!(template_id = %template_id, "Template no longer active at render time");
                return Err(RenderError::TemplateNotFound);
            }
            Err(e) => {
                tracing::error!(template_id = %template_id, error = %e, "Failed to load template for rendering");
                return Err(RenderError::TemplateNotFound);
            }
        };

        let mut model = self.resolve_model(attributes).await;
        let entity = self.resolve_entity(attributes).await;
        if model.is_none() {
            model = entity.as_ref().and_then(|e| e.model.clone());
        }

        let context = build_context(attributes, request_path, model, entity);
        let output = self.engine.render(&template.content, &context).map_err(|e| {
            tracing::error!(template_id = %template_id, error = %e, "Template engine failed");
            RenderError::from(e)
        })?;

        metrics::record_render(started);
        Ok(output)
    }

    async fn resolve_model(&self, attributes: &RequestAttributes) -> Option<ModelRecord> {
        let lookup = if let Some(id) = attributes.get_str(MODEL_ID_KEY) {
            self.models.find_valid_model_by_id(&id).await
        } else if let Some(code) = attributes.get_str(MODEL_CODE_KEY) {
            self.models.find_valid_model_by_code(&code).await
        } else {
            return None;
        };

        lookup.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Model lookup failed");
            None
        })
    }

    async fn resolve_entity(&self, attributes: &RequestAttributes) -> Option<EntityRecord> {
        let id = attributes.get_str(ENTITY_ID_KEY)?;
        self.entities.find_entity_by_id(&id).await.unwrap_or_else(|e| {
            tracing::warn!(entity_id = %id, error = %e, "Entity lookup failed");
            None
        })
    }
}

/// Request attributes, then `path`, `model` and `entity` on top.
fn build_context(
    attributes: &RequestAttributes,
    request_path: &str,
    model: Option<ModelRecord>,
    entity: Option<EntityRecord>,
) -> Map<String, Value> {
    let mut context = attributes.as_map().clone();
    context.insert("path".to_string(), Value::String(normalize_request_path(request_path)));
    context.insert("model".to_string(), to_value(model));
    context.insert("entity".to_string(), to_value(entity));
    context
}

fn to_value<T: serde::Serialize>(value: Option<T>) -> Value {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}
