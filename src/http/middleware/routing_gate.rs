//! Routing gate middleware.
//! Admits catch-all requests only when a stored template serves the path.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use std::time::Instant;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::RequestAttributes;

/// Attribute holding the name of the framework route that caught the request.
pub const ROUTE_KEY: &str = "_route";
pub const MAIN_ROUTE_NAME: &str = "cms-render-main";

/// Builds the request attributes, runs the routing condition and attaches the
/// attributes for the render handler. Declined requests get the plain 404 an
/// unknown route would get.
pub async fn routing_gate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let path = req.uri().path().to_string();

    let mut attributes = RequestAttributes::new();
    attributes.set(ROUTE_KEY, MAIN_ROUTE_NAME);
    let raw = path.trim_start_matches('/');
    attributes.set("path", percent_decode_str(raw).decode_utf8_lossy().into_owned());

    if !state.routing.check(&path, &mut attributes).await {
        metrics::record_request("not_routed", started);
        return StatusCode::NOT_FOUND.into_response();
    }

    req.extensions_mut().insert(attributes);
    next.run(req).await
}
