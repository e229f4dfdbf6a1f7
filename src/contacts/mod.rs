//! Static contacts dataset and the framework-based server that exposes it.
//!
//! The dataset is embedded at compile time from `data/contacts.json` and
//! parsed once at startup.

pub mod server;

use serde::{Deserialize, Serialize};

const CONTACTS_JSON: &str = include_str!("../../data/contacts.json");

/// A mock contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub ip_address: String,
}

/// Parse the embedded dataset.
pub fn load_contacts() -> Result<Vec<Contact>, serde_json::Error> {
    serde_json::from_str(CONTACTS_JSON)
}
