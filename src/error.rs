//! API error taxonomy.
//!
//! Every failure a handler can produce maps to exactly one status code and
//! is rendered by the response codec as `{ "error": "<message>" }`.

use hyper::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is not valid JSON.
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    /// Required fields missing or empty.
    #[error(transparent)]
    Validation(StoreError),

    /// No route matched the request path.
    #[error("Route not found")]
    RouteNotFound,

    /// Verb is not one the server handles at all.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Request body did not arrive in time.
    #[error("Request timeout")]
    RequestTimeout,

    /// Request body exceeded the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge { limit: usize },

    /// Anything the client cannot fix.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingFields => ApiError::Validation(err),
            StoreError::IdsExhausted => ApiError::Internal(err.to_string()),
        }
    }
}
