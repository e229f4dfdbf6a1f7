//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up the handler for a (method, path) pair
//! - Answer preflight and unsupported verbs before route lookup
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - Exact paths are checked before parameterized ones
//! - Unknown method on a known path is 404, not 405

use hyper::StatusCode;

use crate::error::ApiError;
use crate::http::request::{ApiMethod, ApiRequest};
use crate::http::response::ApiResponse;
use crate::routing::matcher::{PathPattern, RouteParams};

/// Route handler. Runs only after the request body has been fully received.
pub type Handler<S> = fn(&S, &ApiRequest, &RouteParams) -> Result<ApiResponse, ApiError>;

/// A single route table entry.
pub struct Route<S> {
    method: ApiMethod,
    pattern: PathPattern,
    name: &'static str,
    handler: Handler<S>,
}

impl<S> Route<S> {
    pub fn method(&self) -> ApiMethod {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Route identifier for logging/metrics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<S> std::fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .finish()
    }
}

/// Result of dispatching one request.
#[derive(Debug)]
pub struct Dispatched {
    pub response: ApiResponse,
    /// Name of the matched route, or a fixed label for requests answered before lookup.
    pub route: &'static str,
}

/// Declarative route table.
pub struct Router<S> {
    routes: Vec<Route<S>>,
}

impl<S> Router<S> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a route. `pattern` is a literal path or ends in `/:param`.
    pub fn route(
        mut self,
        method: ApiMethod,
        pattern: &str,
        name: &'static str,
        handler: Handler<S>,
    ) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            name,
            handler,
        });
        self
    }

    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    /// Find the route for `method` and `path`.
    pub fn resolve(&self, method: ApiMethod, path: &str) -> Option<(&Route<S>, RouteParams)> {
        let candidates = || self.routes.iter().filter(move |r| r.method == method);

        candidates()
            .filter(|r| r.pattern.is_exact())
            .chain(candidates().filter(|r| !r.pattern.is_exact()))
            .find_map(|r| r.pattern.matches(path).map(|params| (r, params)))
    }

    /// Dispatch a fully received request to its handler.
    pub fn dispatch(&self, state: &S, request: &ApiRequest) -> Dispatched {
        let method = match ApiMethod::parse(request.method()) {
            Some(ApiMethod::Options) => {
                return Dispatched {
                    response: ApiResponse::empty(StatusCode::OK),
                    route: "preflight",
                };
            }
            Some(method) => method,
            None => {
                return Dispatched {
                    response: ApiError::MethodNotAllowed.into(),
                    route: "unsupported_method",
                };
            }
        };

        let Some((route, params)) = self.resolve(method, request.path()) else {
            tracing::debug!(method = %method, path = %request.path(), "No route matched");
            return Dispatched {
                response: ApiError::RouteNotFound.into(),
                route: "not_found",
            };
        };

        let response = match (route.handler)(state, request, &params) {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(route = route.name, error = %err, "Handler returned error");
                err.into()
            }
        };

        Dispatched {
            response,
            route: route.name,
        }
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    fn exact(_: &Counter, _: &ApiRequest, _: &RouteParams) -> Result<ApiResponse, ApiError> {
        Ok(ApiResponse::text("exact"))
    }

    fn param(_: &Counter, _: &ApiRequest, p: &RouteParams) -> Result<ApiResponse, ApiError> {
        Ok(ApiResponse::text(format!("param:{}", p.get("id").unwrap_or(""))))
    }

    fn failing(_: &Counter, _: &ApiRequest, _: &RouteParams) -> Result<ApiResponse, ApiError> {
        Err(ApiError::Internal("nope".into()))
    }

    fn router() -> Router<Counter> {
        Router::new()
            .route(ApiMethod::Get, "/items/:id", "item", param)
            .route(ApiMethod::Get, "/items/special", "special", exact)
            .route(ApiMethod::Post, "/fail", "fail", failing)
    }

    fn body(d: &Dispatched) -> &str {
        std::str::from_utf8(&d.response.body).unwrap()
    }

    #[test]
    fn exact_wins_over_param_regardless_of_order() {
        let d = router().dispatch(&Counter, &ApiRequest::new("GET", "/items/special"));
        assert_eq!(d.route, "special");
        assert_eq!(body(&d), "exact");

        let d = router().dispatch(&Counter, &ApiRequest::new("GET", "/items/9"));
        assert_eq!(d.route, "item");
        assert_eq!(body(&d), "param:9");
    }

    #[test]
    fn known_path_wrong_method_is_not_found() {
        let d = router().dispatch(&Counter, &ApiRequest::new("DELETE", "/items/special"));
        assert_eq!(d.response.status, StatusCode::NOT_FOUND);
        assert_eq!(body(&d), r#"{"error":"Route not found"}"#);
    }

    #[test]
    fn unsupported_method() {
        let d = router().dispatch(&Counter, &ApiRequest::new("PATCH", "/items/1"));
        assert_eq!(d.response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body(&d), r#"{"error":"Method not allowed"}"#);
    }

    #[test]
    fn options_short_circuits() {
        let d = router().dispatch(&Counter, &ApiRequest::new("OPTIONS", "/does/not/exist"));
        assert_eq!(d.response.status, StatusCode::OK);
        assert!(d.response.body.is_empty());
        assert_eq!(d.response.content_type, None);
    }

    #[test]
    fn handler_errors_are_rendered() {
        let d = router().dispatch(&Counter, &ApiRequest::new("post", "/fail"));
        assert_eq!(d.route, "fail");
        assert_eq!(d.response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
