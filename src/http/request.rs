//! Request descriptor and body reading.
//!
//! # Responsibilities
//! - Normalize the wire method and split the request target into path + query
//! - Read the full body before any handler runs
//! - Enforce the body size limit while reading
//!
//! # Design Decisions
//! - Handlers only ever see a fully buffered body
//! - Repeated query keys: last value wins
//! - A body that stops mid-stream is an abort, not a client error response

use std::collections::BTreeMap;
use std::error::Error as StdError;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::Request;
use thiserror::Error;

use crate::error::ApiError;

/// Boxed error type produced by body streams.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Verbs the API dispatches. Anything else is answered with 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
}

impl ApiMethod {
    /// Parse a method name, ignoring case.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_lowercase().as_str() {
            "get" => Some(ApiMethod::Get),
            "post" => Some(ApiMethod::Post),
            "put" => Some(ApiMethod::Put),
            "delete" => Some(ApiMethod::Delete),
            "options" => Some(ApiMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Delete => "DELETE",
            ApiMethod::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while reading a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request body aborted: {0}")]
    Aborted(#[source] BoxError),
}

/// A fully received request, independent of the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: String,
    path: String,
    query: BTreeMap<String, String>,
    body: Bytes,
}

impl ApiRequest {
    /// Build a descriptor from a method and a raw request target such as `/api/users?page=2`.
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        Self {
            method: method.to_ascii_lowercase(),
            path: path.to_string(),
            query: parse_query(query),
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Read the complete body of `req` (up to `limit` bytes) into a descriptor.
    pub async fn from_http<B>(req: Request<B>, limit: usize) -> Result<Self, BodyError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let body = read_body(body, limit).await?;
        Ok(Self {
            method: parts.method.as_str().to_ascii_lowercase(),
            path: parts.uri.path().to_string(),
            query: parse_query(parts.uri.query()),
            body,
        })
    }

    /// Lower-cased wire method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Parse the body as JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, ApiError> {
        serde_json::from_slice(&self.body).map_err(ApiError::InvalidJson)
    }
}

/// Collect a body stream, failing once more than `limit` bytes arrive.
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, BodyError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(BodyError::TooLarge { limit }),
        Err(e) => Err(BodyError::Aborted(e)),
    }
}

/// Parse a urlencoded query string. Repeated keys keep the last value.
pub fn parse_query(query: Option<&str>) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }
    params
}
