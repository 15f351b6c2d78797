//! In-memory cache of database snapshots.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::record::Records;

/// Concurrency-safe map from database id to its last successful fetch.
///
/// Keys keep the caller's original spelling of the id. The lock is only held
/// for the map operation itself, never across a remote call.
#[derive(Debug, Default)]
pub struct CacheStore {
    databases: RwLock<HashMap<String, Records>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached records for `database_id`, if present.
    pub async fn get(&self, database_id: &str) -> Option<Records> {
        self.databases.read().await.get(database_id).cloned()
    }

    /// Swap the entire map in one step.
    pub async fn replace_all(&self, databases: HashMap<String, Records>) {
        *self.databases.write().await = databases;
    }

    /// Insert or overwrite one database.
    pub async fn put(&self, database_id: &str, records: Records) {
        self.databases.write().await.insert(database_id.to_string(), records);
    }

    /// Snapshot of the cached ids, sorted.
    pub async fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.databases.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.databases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.databases.read().await.is_empty()
    }
}
