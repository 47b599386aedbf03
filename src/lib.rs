//! CMS template router library.
//!
//! Serves pages whose URL patterns are stored as template records: a routing
//! gate matches each request against a cached route table built from the
//! active templates, and the render entry point renders the matched template.

// Core subsystems
pub mod cache;
pub mod render;
pub mod routing;
pub mod template;

// Serving
pub mod admin;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod seed;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
