//! Admin API: read-only diagnostics and manual cache invalidation, behind a
//! bearer token.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/match", get(get_match))
        .route("/admin/cache/invalidate", post(invalidate_cache))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
