//! Users API: application state and the route table.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/` | static HTML page |
//! | GET | `/about` | plain text |
//! | GET | `/contacts` | static contacts dataset |
//! | GET | `/api/users` | list + echoed query |
//! | GET | `/api/health` | status, timestamp, uptime |
//! | POST | `/api/users` | create |
//! | PUT | `/api/users/:id` | upsert |
//! | DELETE | `/api/users/:id` | delete (idempotent) |

pub mod handlers;
pub mod pages;

use std::sync::Arc;
use std::time::Instant;

use crate::contacts::Contact;
use crate::http::request::ApiMethod;
use crate::routing::Router;
use crate::store::UserStore;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub contacts: Arc<Vec<Contact>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<UserStore>, contacts: Arc<Vec<Contact>>) -> Self {
        Self {
            store,
            contacts,
            started_at: Instant::now(),
        }
    }
}

/// Build the users API route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(ApiMethod::Get, "/", "home", handlers::home)
        .route(ApiMethod::Get, "/about", "about", handlers::about)
        .route(ApiMethod::Get, "/contacts", "list_contacts", handlers::list_contacts)
        .route(ApiMethod::Get, "/api/users", "list_users", handlers::list_users)
        .route(ApiMethod::Get, "/api/health", "health", handlers::health)
        .route(ApiMethod::Post, "/api/users", "create_user", handlers::create_user)
        .route(ApiMethod::Put, "/api/users/:id", "update_user", handlers::update_user)
        .route(ApiMethod::Delete, "/api/users/:id", "delete_user", handlers::delete_user)
}
