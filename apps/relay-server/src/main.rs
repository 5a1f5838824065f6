//! # WMOC Relay Server
//!
//! HTTP relay between mining-rig agents and the operator dashboard.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay Server Startup                             │
//! │                                                                         │
//! │  1. tracing (RUST_LOG, default "info")                                  │
//! │  2. RelayConfig::load (argv[1] | $WMOC_CONFIG | relay.toml, then env)  │
//! │  3. open store (memory, or Redis: fail fast if unreachable)             │
//! │  4. bind + serve                                                        │
//! │  5. Ctrl+C / SIGTERM ──► drain in-flight requests ──► exit              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wmoc_relay::{Relay, RelayConfig, RelayServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting WMOC relay server...");

    // Load configuration
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = RelayConfig::load(config_path).context("loading relay configuration")?;
    info!(
        addr = %config.bind_address(),
        backend = %config.store.backend,
        ttl_hours = config.retention.ttl_hours,
        "Configuration loaded"
    );

    // Connect to the store
    let relay = Relay::from_config(&config)
        .await
        .context("opening relay store")?;

    // Start server
    let handle = RelayServer::new(config.server.clone(), Arc::new(relay))
        .start()
        .await
        .context("starting relay server")?;
    info!(addr = %handle.local_addr(), "Relay server listening");

    shutdown_signal().await;

    handle.shutdown().await.context("stopping relay server")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
