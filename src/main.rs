//! CMS template router.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing gate ──▶ render handler ──▶ Response
//!                                          │                 │
//!                                          ▼                 ▼
//!                                    route cache        render entry point
//!                                          │                 │
//!                                          ▼                 ▼
//!                                  route table builder   template store,
//!                                          │             models, entities,
//!                                          ▼             template engine
//!                                    template store
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use cms_template::config::{load_config, AppConfig};
use cms_template::lifecycle::{bootstrap, Shutdown};
use cms_template::observability::{logging, metrics};
use cms_template::HttpServer;

#[derive(Parser)]
#[command(name = "cms-template")]
#[command(about = "Serves CMS pages routed by stored template paths", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cms-template starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        route_cache_ttl_secs = config.routing.cache_ttl_secs,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let services = bootstrap(config).await?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(services.state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
