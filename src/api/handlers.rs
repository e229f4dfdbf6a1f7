//! Route handlers for the users API.

use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::api::{pages, AppState};
use crate::contacts::Contact;
use crate::error::ApiError;
use crate::http::request::ApiRequest;
use crate::http::response::ApiResponse;
use crate::routing::RouteParams;
use crate::store::{now_iso8601, User, UserInput};

#[derive(Serialize)]
pub struct UserList<'a> {
    pub users: Vec<User>,
    pub query: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
}

#[derive(Serialize)]
pub struct UserMessage {
    pub message: &'static str,
    pub user: User,
}

#[derive(Serialize)]
pub struct Acknowledgement {
    pub message: String,
}

pub fn home(_: &AppState, _: &ApiRequest, _: &RouteParams) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::html(pages::HOME_PAGE))
}

pub fn about(_: &AppState, _: &ApiRequest, _: &RouteParams) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse::text(pages::ABOUT_TEXT))
}

/// All users; the query string is echoed back, not applied.
pub fn list_users(
    state: &AppState,
    req: &ApiRequest,
    _: &RouteParams,
) -> Result<ApiResponse, ApiError> {
    let body = UserList {
        users: state.store.list(),
        query: req.query(),
    };
    Ok(ApiResponse::json(StatusCode::OK, &body))
}

pub fn health(state: &AppState, _: &ApiRequest, _: &RouteParams) -> Result<ApiResponse, ApiError> {
    let body = HealthStatus {
        status: "healthy",
        timestamp: now_iso8601(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    };
    Ok(ApiResponse::json(StatusCode::OK, &body))
}

pub fn list_contacts(
    state: &AppState,
    _: &ApiRequest,
    _: &RouteParams,
) -> Result<ApiResponse, ApiError> {
    let contacts: &[Contact] = &state.contacts;
    Ok(ApiResponse::json(StatusCode::OK, contacts))
}

pub fn create_user(
    state: &AppState,
    req: &ApiRequest,
    _: &RouteParams,
) -> Result<ApiResponse, ApiError> {
    let input = user_input(req)?;
    let user = state.store.create(input)?;
    tracing::info!(user_id = user.id, "User created");

    let body = UserMessage {
        message: "User created",
        user,
    };
    Ok(ApiResponse::json(StatusCode::CREATED, &body))
}

pub fn update_user(
    state: &AppState,
    req: &ApiRequest,
    params: &RouteParams,
) -> Result<ApiResponse, ApiError> {
    let id = params.id("id")?;
    let input = user_input(req)?;
    let user = state.store.update(id, input);
    tracing::info!(user_id = id, "User updated");

    let body = UserMessage {
        message: "User updated",
        user,
    };
    Ok(ApiResponse::json(StatusCode::OK, &body))
}

/// Idempotent: deleting an unknown id is acknowledged the same way.
pub fn delete_user(
    state: &AppState,
    _: &ApiRequest,
    params: &RouteParams,
) -> Result<ApiResponse, ApiError> {
    let id = params.id("id")?;
    let removed = state.store.delete(id);
    tracing::info!(user_id = id, existed = removed.is_some(), "User deleted");

    let body = Acknowledgement {
        message: format!("User {} deleted successfully", id),
    };
    Ok(ApiResponse::json(StatusCode::OK, &body))
}

/// Parse the body as JSON, then read `name`/`email`.
///
/// `null` has no fields to read and counts as invalid JSON. Any other
/// non-object body yields empty input. A field that is not a string is
/// treated as absent.
fn user_input(req: &ApiRequest) -> Result<UserInput, ApiError> {
    let fields = match req.json_body()? {
        Value::Object(fields) => fields,
        Value::Null => {
            return Err(ApiError::InvalidJson(serde::de::Error::custom(
                "request body is null",
            )))
        }
        _ => return Ok(UserInput::default()),
    };

    let field = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
    Ok(UserInput {
        name: field("name"),
        email: field("email"),
    })
}
