//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1.1, request ID, span)
//!     → request.rs (read full body, build ApiRequest)
//!     → routing (dispatch to handler)
//!     → response.rs (serialize, add CORS headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ApiMethod, ApiRequest, BodyError};
pub use response::{ApiResponse, X_REQUEST_ID};
pub use server::HttpServer;
