//! Connection-level HTTP server for the users API.
//!
//! # Responsibilities
//! - Accept connections through the bounded listener
//! - Serve HTTP/1.1 on each connection with hyper, no framework
//! - Read each request body completely before dispatching it
//! - Tag every request with an ID, a tracing span and metrics
//! - Drain connections on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::{service_fn, Service};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::http::request::{ApiRequest, BodyError, BoxError};
use crate::http::response::{ApiResponse, X_REQUEST_ID};
use crate::net::{ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::routing::Router;

/// Everything a connection task needs, shared via Arc.
struct App {
    router: Router<AppState>,
    state: AppState,
    max_body_size: usize,
    request_timeout: Duration,
}

/// HTTP server for the users API.
pub struct HttpServer {
    app: Arc<App>,
    config: ServerConfig,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and state.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let app = App {
            router: api::routes(),
            state,
            max_body_size: config.security.max_body_size,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        Self {
            app: Arc::new(app),
            config,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Log the route table, like a startup banner.
    pub fn log_routes(&self) {
        for route in self.app.router.routes() {
            tracing::info!(
                method = %route.method(),
                path = %route.pattern(),
                name = route.name(),
                "Route registered"
            );
        }
    }

    /// Run the server until `shutdown` fires, then drain connections.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        let app = Arc::clone(&self.app);
                        let tracker = self.tracker.clone();
                        tokio::spawn(async move {
                            let _permit = permit;
                            serve_connection(app, tracker, stream, peer).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        self.tracker.start_draining();

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        if self.tracker.wait_for_idle(grace).await {
            tracing::info!("All connections drained");
        } else {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                "Grace period elapsed with connections still open"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn serve_connection(
    app: Arc<App>,
    tracker: ConnectionTracker,
    stream: TcpStream,
    peer: SocketAddr,
) {
    let guard = tracker.track();
    let connection_id = guard.id();

    let service = make_service(app);

    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let result = tokio::select! {
        res = conn.as_mut() => res,
        _ = tracker.drained() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(e) = result {
        // Client went away mid-request; nothing left to answer.
        tracing::debug!(connection_id = %connection_id, peer = %peer, error = %e, "Connection ended with error");
    }
    drop(guard);
}

/// Wrap `handle` as a hyper service, naming its error type.
fn make_service(
    app: Arc<App>,
) -> impl Service<Request<Incoming>, Response = Response<Full<Bytes>>, Error = BoxError, Future: Send> + Clone {
    service_fn(move |req: Request<Incoming>| {
        let app = Arc::clone(&app);
        async move { handle(app, req).await }
    })
}

/// Turn one hyper request into a response.
///
/// An `Err` aborts the connection; it is only returned when the client
/// stopped sending the body.
async fn handle(app: Arc<App>, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, BoxError> {
    let start = Instant::now();
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let span = tracing::info_span!("request", request_id = %request_id, method = %method, path = %path);

    async move {
        let read = tokio::time::timeout(
            app.request_timeout,
            ApiRequest::from_http(req, app.max_body_size),
        )
        .await;

        let (response, route) = match read {
            Ok(Ok(request)) => {
                let dispatched = app.router.dispatch(&app.state, &request);
                (dispatched.response, dispatched.route)
            }
            Ok(Err(BodyError::Aborted(e))) => {
                tracing::debug!(error = %e, "Client aborted request body");
                return Err(e);
            }
            Ok(Err(BodyError::TooLarge { limit })) => {
                tracing::warn!(limit, "Request body rejected");
                (ApiResponse::from(ApiError::PayloadTooLarge { limit }), "body_too_large")
            }
            Err(_) => {
                tracing::warn!("Timed out reading request body");
                (ApiResponse::from(ApiError::RequestTimeout), "timeout")
            }
        };

        let status = response.status.as_u16();
        metrics::record_request(&method, route, status, start);
        tracing::info!(
            status,
            route,
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        Ok(response.into_http(&request_id))
    }
    .instrument(span)
    .await
}
