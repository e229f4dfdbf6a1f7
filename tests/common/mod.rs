//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use users_api::contacts::load_contacts;
use users_api::net::Listener;
use users_api::{AppState, HttpServer, ServerConfig, Shutdown, UserStore};

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Config bound to 127.0.0.1:0 with short timeouts.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.timeouts.request_secs = 5;
    config.timeouts.shutdown_grace_secs = 2;
    config
}

/// Bind and start a users API server with the seeded store.
pub async fn spawn_server(config: ServerConfig) -> TestServer {
    let contacts = load_contacts().unwrap();
    let state = AppState::new(Arc::new(UserStore::with_sample_users()), Arc::new(contacts));

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Non-pooled client so shutdown tests are not held up by idle connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
