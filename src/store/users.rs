//! User records and the store that owns them.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::now_iso8601;

/// Errors raised by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Name and email are required")]
    MissingFields,

    /// Every id from the counter onwards is taken.
    #[error("User id space exhausted")]
    IdsExhausted,
}

/// A stored user.
///
/// Records written by PUT keep only the fields the client sent, so `name`
/// and `email` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Client-supplied fields for create and update.
///
/// Both fields are optional at the wire level. Create requires both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    fn require(self) -> Result<(String, String), StoreError> {
        match (self.name, self.email) {
            (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => {
                Ok((name, email))
            }
            _ => Err(StoreError::MissingFields),
        }
    }
}

#[derive(Debug)]
struct Inner {
    users: BTreeMap<u64, User>,
    /// Next candidate id; `None` once `u64::MAX` has been handed out.
    next_id: Option<u64>,
}

impl Inner {
    /// Take the next free id from the counter. Ids occupied by upserts are skipped.
    fn allocate_id(&mut self) -> Result<u64, StoreError> {
        loop {
            let id = self.next_id.ok_or(StoreError::IdsExhausted)?;
            self.next_id = id.checked_add(1);
            if !self.users.contains_key(&id) {
                return Ok(id);
            }
        }
    }
}

/// Process-wide user collection.
#[derive(Debug)]
pub struct UserStore {
    inner: RwLock<Inner>,
}

impl UserStore {
    /// Create an empty store. The first created user gets id 1.
    pub fn new() -> Self {
        Self::from_users(BTreeMap::new())
    }

    /// Create a store holding the three sample users (ids 1..=3).
    pub fn with_sample_users() -> Self {
        let samples = [
            ("John Doe", "john@example.com"),
            ("Jane Smith", "jane@example.com"),
            ("Bob Johnson", "bob@example.com"),
        ];

        let users = samples
            .iter()
            .zip(1u64..)
            .map(|((name, email), id)| {
                let user = User {
                    id,
                    name: Some((*name).to_string()),
                    email: Some((*email).to_string()),
                    created_at: None,
                    updated_at: None,
                };
                (id, user)
            })
            .collect();

        Self::from_users(users)
    }

    fn from_users(users: BTreeMap<u64, User>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                users,
                next_id: Some(1),
            }),
        }
    }

    /// All users ordered by id.
    pub fn list(&self) -> Vec<User> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.users.values().cloned().collect()
    }

    /// Insert a new user under a freshly allocated id.
    pub fn create(&self, input: UserInput) -> Result<User, StoreError> {
        let (name, email) = input.require()?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = inner.allocate_id()?;

        let user = User {
            id,
            name: Some(name),
            email: Some(email),
            created_at: Some(now_iso8601()),
            updated_at: None,
        };
        inner.users.insert(id, user.clone());

        tracing::debug!(user_id = id, "User created");
        Ok(user)
    }

    /// Replace the record at `id` with the given fields, inserting it if absent.
    ///
    /// Fields missing from `input` are dropped from the record. An existing
    /// `createdAt` is kept. The id counter is untouched; `create` skips ids
    /// taken this way.
    pub fn update(&self, id: u64, input: UserInput) -> User {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let created_at = inner.users.get(&id).and_then(|u| u.created_at.clone());
        let user = User {
            id,
            name: input.name,
            email: input.email,
            created_at,
            updated_at: Some(now_iso8601()),
        };
        let previous = inner.users.insert(id, user.clone());

        tracing::debug!(user_id = id, existed = previous.is_some(), "User updated");
        user
    }

    /// Remove `id`. Returns the removed record, if there was one.
    pub fn delete(&self, id: u64) -> Option<User> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let removed = inner.users.remove(&id);
        tracing::debug!(user_id = id, existed = removed.is_some(), "User deleted");
        removed
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
