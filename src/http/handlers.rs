//! Request handlers for the page routes.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Extension,
};
use std::time::Instant;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::render::RenderError;
use crate::routing::RequestAttributes;

/// Renders the template the routing gate bound to this request.
pub async fn render_handler(
    State(state): State<AppState>,
    Extension(attributes): Extension<RequestAttributes>,
    uri: Uri,
) -> Response {
    let started = Instant::now();

    match state.renderer.render(uri.path(), &attributes).await {
        Ok(body) => {
            metrics::record_request("rendered", started);
            Html(body).into_response()
        }
        Err(RenderError::TemplateNotFound) => {
            metrics::record_request("template_gone", started);
            (StatusCode::NOT_FOUND, RenderError::TemplateNotFound.to_string()).into_response()
        }
        Err(RenderError::Engine(_)) => {
            metrics::record_request("render_error", started);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}
