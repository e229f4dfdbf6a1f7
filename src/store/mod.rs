//! In-memory resource store.
//!
//! # Data Flow
//! ```text
//! Handler (validated payload)
//!     → users.rs (create / update / delete under a single lock)
//!     → User record returned by value
//! ```
//!
//! # Design Decisions
//! - Store is an explicit object injected through `AppState`, never a global
//! - All mutations serialized behind one `RwLock`
//! - Ids come from a monotonic counter, never from the clock

pub mod users;

pub use users::{StoreError, User, UserInput, UserStore};

use chrono::{SecondsFormat, Utc};

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
