//! Rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RequestAttributes (from the routing gate)
//!     → controller.rs (re-load active template, resolve model/entity)
//!     → resolver.rs (model and entity lookups)
//!     → engine.rs (template source + context → output)
//!     → rendered body
//! ```

pub mod controller;
pub mod engine;
pub mod resolver;

pub use controller::{RenderController, RenderError, ENTITY_ID_KEY, MODEL_CODE_KEY, MODEL_ID_KEY};
pub use engine::{EngineError, HandlebarsEngine, TemplateEngine};
pub use resolver::{
    EntityRecord, EntityRepository, InMemoryCatalog, LookupError, ModelRecord, ModelRepository,
};
