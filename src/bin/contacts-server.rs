//! Contacts server: the static dataset behind an Axum router.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use users_api::config::{load_config, Overrides};
use users_api::contacts::{load_contacts, server};
use users_api::lifecycle::{shutdown_signal, Shutdown};
use users_api::observability::logging;

#[derive(Parser)]
#[command(name = "contacts-server")]
#[command(about = "Serves the mock contacts dataset", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long, env = "USERS_API_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

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

    let contacts = load_contacts()?;
    tracing::info!(contacts = contacts.len(), "Contacts dataset loaded");

    let app = server::build_router(&config, Arc::new(contacts));
    let listener =
        TcpListener::bind((config.listener.host.as_str(), config.listener.port)).await?;
    tracing::info!("Contacts app listening on http://{}/", listener.local_addr()?);

    let shutdown = Shutdown::new();
    let mut server_task = tokio::spawn(server::run(listener, app, shutdown.subscribe()));

    tokio::select! {
        joined = &mut server_task => {
            joined??;
            return Ok(());
        }
        signal = shutdown_signal() => {
            tracing::info!(signal, "Signal received, shutting down gracefully");
            shutdown.trigger();
        }
    }

    server_task.await??;
    Ok(())
}
