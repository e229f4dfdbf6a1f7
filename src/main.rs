//! Users API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request         ┌──────────────────────────────────────────────────┐
//!     ───────────────────────┼─▶ net::Listener ─▶ http::server ─▶ http::request │
//!                            │                   (hyper, span)   (full body)    │
//!                            │                                        │         │
//!                            │                                        ▼         │
//!                            │                               routing::Router    │
//!                            │                                        │         │
//!                            │                                        ▼         │
//!                            │                  api::handlers ◀──▶ store        │
//!                            │                        │                         │
//!     Client Response        │                        ▼                         │
//!     ◀──────────────────────┼──────────────── http::response (JSON/HTML/text)  │
//!                            │                                                  │
//!                            │  config · lifecycle · observability              │
//!                            └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use users_api::config::{load_config, Overrides};
use users_api::contacts::load_contacts;
use users_api::lifecycle::{shutdown_signal, Shutdown};
use users_api::net::Listener;
use users_api::observability::{logging, metrics};
use users_api::{AppState, HttpServer, UserStore};

#[derive(Parser)]
#[command(name = "users-api")]
#[command(about = "In-memory users REST API served without a web framework", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long, env = "USERS_API_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind (overrides HOST and the config file).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PORT and the config file).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let overrides = Overrides {
        host: args.host,
        port: args.port,
    };
    let config = load_config(args.config.as_deref(), &overrides)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("users-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        address = %config.listener.display_address(),
        max_connections = config.listener.max_connections,
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

    let store = if config.store.seed_sample_users {
        UserStore::with_sample_users()
    } else {
        UserStore::new()
    };
    let contacts = load_contacts()?;
    let state = AppState::new(Arc::new(store), Arc::new(contacts));

    let listener = Listener::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Server running at http://{}/", local_addr);

    let server = HttpServer::new(config, state);
    server.log_routes();

    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        joined = &mut server_task => {
            joined??;
            tracing::warn!("Server exited without a shutdown signal");
            return Ok(());
        }
        signal = shutdown_signal() => {
            tracing::info!(signal, "Signal received, shutting down gracefully");
            shutdown.trigger();
        }
    }

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
