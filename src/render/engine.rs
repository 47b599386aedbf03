//! Template engine seam.
//!
//! The renderer treats the engine as a black box: source + context in, text out.
//! [`HandlebarsEngine`] is the engine shipped with the service.

use handlebars::Handlebars;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("template rendering failed: {0}")]
    Handlebars(#[from] handlebars::RenderError),
}

pub trait TemplateEngine: Send + Sync {
    fn render(&self, source: &str, context: &Map<String, Value>) -> Result<String, EngineError>;
}

/// Renders stored content as a Handlebars template.
///
/// `{{ id }}` and `{{ entity.values.price }}` read from the context; missing values and
/// `null` render as nothing. Output of `{{ }}` is HTML-escaped, `{{{ }}}` is not.
pub struct HandlebarsEngine {
    handlebars: Handlebars<'static>,
}

impl HandlebarsEngine {
    pub fn new() -> Self {
        Self {
            handlebars: Handlebars::new(),
        }
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn render(&self, source: &str, context: &Map<String, Value>) -> Result<String, EngineError> {
        let data = Value::Object(context.clone());
        Ok(self.handlebars.render_template(source, &data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_plain_content_untouched() {
        let out = HandlebarsEngine::new().render("<h1>About</h1>", &Map::new()).unwrap();
        assert_eq!(out, "<h1>About</h1>");
    }

    #[test]
    fn test_substitution_and_dotted_lookup() {
        let ctx = context(json!({
            "id": "42",
            "entity": { "title": "Widget", "values": { "price": 10 } },
            "model": null
        }));
        let out = HandlebarsEngine::new()
            .render(
                "{{ id }}|{{entity.title}}|{{ entity.values.price }}|{{ model.code }}|{{ missing }}",
                &ctx,
            )
            .unwrap();
        assert_eq!(out, "42|Widget|10||");
    }

    #[test]
    fn test_strings_are_escaped() {
        let ctx = context(json!({ "q": "<script>" }));
        let engine = HandlebarsEngine::new();
        assert_eq!(engine.render("{{ q }}", &ctx).unwrap(), "&lt;script&gt;");
        assert_eq!(engine.render("{{{ q }}}", &ctx).unwrap(), "<script>");
    }

    #[test]
    fn test_syntax_errors() {
        let engine = HandlebarsEngine::new();
        assert!(engine.render("ok {{ broken", &Map::new()).is_err());
        assert!(engine.render("{{#if x}}never closed", &Map::new()).is_err());
    }
}
