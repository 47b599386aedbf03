//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Gate the catch-all route with the routing condition
//! - Bind server to listener and stop on shutdown

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::cache::TagAwareCache;
use crate::config::AppConfig;
use crate::http::handlers::{healthz, render_handler};
use crate::http::middleware::routing_gate;
use crate::render::{EntityRepository, ModelRepository, RenderController, TemplateEngine};
use crate::routing::{RouteCache, RouteTableBuilder, RoutingCondition};
use crate::template::{TemplateRepository, TemplateStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routing: RoutingCondition,
    pub renderer: RenderController,
    /// Write path for templates; saves through it invalidate the route cache.
    pub repository: TemplateRepository,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the routing and render services around one template store.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn TemplateStore>,
        models: Arc<dyn ModelRepository>,
        entities: Arc<dyn EntityRepository>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        let routes = RouteCache::new(
            RouteTableBuilder::new(store.clone()),
            Arc::new(TagAwareCache::new()),
            config.routing.cache_ttl(),
        );
        let repository = TemplateRepository::new(store.clone()).with_invalidator(routes.invalidator());
        let renderer = RenderController::new(store, models, entities, engine);

        Self {
            routing: RoutingCondition::new(routes),
            renderer,
            repository,
            config: Arc::new(config),
        }
    }
}

/// HTTP server for the template router.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let timeout = Duration::from_secs(state.config.timeouts.request_secs);
        let body_limit = state.config.listener.max_body_bytes;

        let pages = Router::new()
            .route("/", any(render_handler))
            .route("/{*path}", any(render_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), routing_gate));

        let mut router = Router::new().route("/healthz", get(healthz)).merge(pages);

        if state.config.admin.enabled {
            router = router.merge(setup_admin_router(state.clone()));
        }

        router
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(TimeoutLayer::new(timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until Ctrl+C or a shutdown broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            admin_enabled = self.state.config.admin.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fully layered router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Resolves on Ctrl+C or when the shutdown coordinator fires.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = shutdown.recv() => {}
        _ = ctrl_c => {}
    }
    tracing::info!("Shutdown signal received");
}
