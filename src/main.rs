//! Edge router (v0.1)
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                  EDGE ROUTER                  │
//!   Client Request    │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!   ──────────────────┼─▶│  http   │───▶│ routing  │───▶│ handler  │  │
//!                     │  │ server  │    │ dispatch │    │(matched) │  │
//!                     │  └─────────┘    └────┬─────┘    └──────────┘  │
//!                     │                      │ no match               │
//!                     │                      ▼                        │
//!                     │               ┌────────────┐                  │
//!                     │               │ upstream   │──────────────────┼──▶ Origin
//!                     │               │ proxy      │                  │
//!                     │               └────────────┘                  │
//!                     └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_router::config::validation::validate_config;
use edge_router::config::{load_config, ConfigError, EdgeConfig};
use edge_router::controllers::demo_routes;
use edge_router::lifecycle::{signals, Shutdown};
use edge_router::observability::{logging, metrics};
use edge_router::HttpServer;

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Method + path router with upstream pass-through", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `upstream.address`.
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.address = upstream;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);
    tracing::info!("edge-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        request_timeout_secs = config.timeouts.request_secs,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, demo_routes())?;
    server.run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
