use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::routing::{normalize_request_path, RouteMatch, RouteSummary};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    /// `None` when the route table cannot be built.
    pub routes: Option<usize>,
    pub cache_ttl_secs: u64,
}

#[derive(Deserialize)]
pub struct MatchQuery {
    pub path: String,
}

#[derive(Serialize)]
pub struct MatchReport {
    pub path: String,
    pub normalized: String,
    #[serde(rename = "match")]
    pub matched: Option<RouteMatch>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let table = state.routing.routes().table().await;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if table.is_some() { "operational" } else { "degraded" },
        routes: table.map(|t| t.len()),
        cache_ttl_secs: state.config.routing.cache_ttl_secs,
    })
}

pub async fn get_routes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RouteSummary>>, StatusCode> {
    let table = state
        .routing
        .routes()
        .table()
        .await
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(table.summaries()))
}

pub async fn get_match(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> Json<MatchReport> {
    let matched = state.routing.resolve(&query.path).await;
    Json(MatchReport {
        normalized: normalize_request_path(&query.path),
        path: query.path,
        matched,
    })
}

pub async fn invalidate_cache(State(state): State<AppState>) -> StatusCode {
    state.routing.routes().invalidate();
    tracing::info!("Route cache invalidated via admin API");
    StatusCode::NO_CONTENT
}
