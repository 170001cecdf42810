//! auth-gateway
//!
//! A request-security gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 AUTH GATEWAY                   │
//!                    │                                                │
//!   Client Request   │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────┼─▶│rate limit│──▶│  csrf    │──▶│ session   │  │
//!                    │  │ (per IP) │   │  guard   │   │  guard    │  │
//!                    │  └──────────┘   └──────────┘   └─────┬─────┘  │
//!                    │                                      │        │
//!                    │                                      ▼        │
//!                    │  ┌─────────────────────────┐   ┌───────────┐  │
//!                    │  │ session store (single   │◀──│ handlers  │  │
//!                    │  │ slot + csrf bindings)   │   └───────────┘  │
//!                    │  └─────────────────────────┘                  │
//!                    │                                                │
//!                    │  ┌──────────────────────────────────────────┐ │
//!                    │  │           Cross-Cutting Concerns          │ │
//!                    │  │  config · observability · lifecycle       │ │
//!                    │  └──────────────────────────────────────────┘ │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use auth_gateway::config::loader::{self, ConfigError};
use auth_gateway::config::validation::validate_config;
use auth_gateway::config::watcher::ConfigWatcher;
use auth_gateway::config::GatewayConfig;
use auth_gateway::http::HttpServer;
use auth_gateway::lifecycle::Shutdown;
use auth_gateway::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "auth-gateway", about = "Session, CSRF, and rate-limit gateway")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => {
            let mut config = GatewayConfig::default();
            loader::apply_env_overrides(&mut config);
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        session_ttl_secs = config.session.ttl_secs,
        rate_limit = config.rate_limit.max_requests,
        rate_window_ms = config.rate_limit.window_ms,
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

    // The watcher feeds hot-reloadable updates (signing-key rotation).
    // It must stay alive for events to keep flowing.
    let (update_rx, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            (rx, Some(handle))
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (rx, None)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config);
    server.run(listener, update_rx, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
