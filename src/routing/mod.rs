//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! ApiRequest (method, path)
//!     → router.rs (preflight / verb check, route lookup)
//!     → matcher.rs (evaluate path pattern, capture :id)
//!     → handler → ApiResponse
//! ```
//!
//! # Design Decisions
//! - Routes declared once at startup, immutable at runtime
//! - No regex in hot path (literal and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (exact before parameterized, then registration order)

pub mod matcher;
pub mod router;

pub use matcher::{PathPattern, RouteParams};
pub use router::{Dispatched, Handler, Route, Router};
