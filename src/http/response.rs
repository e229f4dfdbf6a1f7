//! Response shaping and serialization.
//!
//! # Responsibilities
//! - Serialize handler results to JSON, HTML or plain text
//! - Render every error as `{ "error": "<message>" }`
//! - Stamp CORS and request-id headers on every response
//!
//! # Design Decisions
//! - Content types are exact literals without charset parameters
//! - Serialization failure degrades to a 500 instead of a panic

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ApiError;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal server error"}"#;

/// Wire-level error payload.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// A transport-independent response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: Bytes,
}

impl ApiResponse {
    /// Serialize `value` as a JSON response.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: Some(CONTENT_TYPE_JSON),
                body: Bytes::from(body),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                Self::internal_error()
            }
        }
    }

    pub fn html(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(CONTENT_TYPE_HTML),
            body: body.into(),
        }
    }

    pub fn text(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(CONTENT_TYPE_TEXT),
            body: body.into(),
        }
    }

    /// No body and no content type (CORS preflight).
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Bytes::new(),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: Some(CONTENT_TYPE_JSON),
            body: Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes()),
        }
    }

    /// Convert into a hyper response carrying CORS and request-id headers.
    pub fn into_http(self, request_id: &str) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
        if let Ok(value) = HeaderValue::from_str(request_id) {
            headers.insert(X_REQUEST_ID, value);
        }

        response
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        if let ApiError::Internal(detail) = &err {
            tracing::error!(detail = %detail, "Internal error");
        }
        let message = err.to_string();
        Self::json(status, &ErrorBody { error: &message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_response() {
        let res = ApiResponse::json(StatusCode::CREATED, &serde_json::json!({ "ok": true }));
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.content_type, Some("application/json"));
        assert_eq!(&res.body[..], br#"{"ok":true}"#);
    }

    #[test]
    fn error_shape() {
        let res = ApiResponse::from(ApiError::RouteNotFound);
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(&res.body[..], br#"{"error":"Route not found"}"#);

        let res = ApiResponse::from(ApiError::Internal("disk on fire".into()));
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&res.body[..], INTERNAL_ERROR_BODY.as_bytes());
    }

    #[test]
    fn http_conversion_adds_cors_and_request_id() {
        let res = ApiResponse::text("hi").into_http("req-1");
        let headers = res.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
        assert_eq!(headers["x-request-id"], "req-1");
    }

    #[test]
    fn empty_response_has_no_content_type() {
        let res = ApiResponse::empty(StatusCode::OK).into_http("req-2");
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(header::CONTENT_TYPE).is_none());
        assert!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
    }
}
