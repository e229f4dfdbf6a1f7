//! Users API Library
//!
//! A hand-rolled REST server for an in-memory users resource, plus a small
//! framework-based server for a static contacts dataset.

pub mod api;
pub mod config;
pub mod contacts;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod store;

pub use api::AppState;
pub use config::ServerConfig;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::UserStore;
