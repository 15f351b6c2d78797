//! Normalized record model served to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One normalized item from a remote database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Remote page id with separators stripped, safe as a URL path segment.
    pub id: String,
    /// Properties in the remote record's order.
    pub properties: Vec<Property>,
    pub last_updated: DateTime<Utc>,
}

/// A named property flattened into printable values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// e.g. `Status`
    pub name: String,
    /// One or more values, e.g. `In Progress`
    pub values: Vec<String>,
}

/// Full result set of one database, shared between the cache and readers.
pub type Records = Arc<Vec<Record>>;

impl Record {
    /// Build a record, stripping `-` from the remote identifier.
    pub fn new(remote_id: &str, properties: Vec<Property>, last_updated: DateTime<Utc>) -> Self {
        Self { id: remote_id.replace('-', ""), properties, last_updated }
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl Property {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self { name: name.into(), values }
    }
}
