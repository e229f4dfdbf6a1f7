//! Axum server for the contacts dataset.
//!
//! # Responsibilities
//! - Create the Axum Router with both handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until the shutdown signal, then drain

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::Html, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::contacts::Contact;

type Contacts = Arc<Vec<Contact>>;

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ServerConfig, contacts: Contacts) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/contacts", get(list_contacts))
        .with_state(contacts)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve `app` until a shutdown signal arrives on `shutdown`.
pub async fn run(
    listener: TcpListener,
    app: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Contacts server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Contacts server draining");
        })
        .await?;

    tracing::info!("Contacts server stopped");
    Ok(())
}

async fn hello() -> Html<&'static str> {
    Html("Hello World!")
}

async fn list_contacts(State(contacts): State<Contacts>) -> Json<Vec<Contact>> {
    Json(contacts.as_ref().clone())
}
