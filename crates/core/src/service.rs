//! Cached query service over a [`RemoteSource`].
//!
//! Reads go through [`DataService::query_cached`], which decides between a
//! cache hit, an on-demand fetch and the ignore-list short circuit. The
//! scheduled refresh (see `scheduler`) rebuilds the whole cache on a timer.
//!
//! Three lock domains are involved and never nested into a cycle: the cache
//! lock and the ignore-list lock are held only for single map operations,
//! while `fetch_lock` is held across the remote call so that at most one
//! on-demand fetch runs at a time, process-wide.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::Error;
use crate::ignore::IgnoreList;
use crate::record::Records;
use crate::scheduler::SchedulerHandle;
use crate::source::{RemoteSource, fetch_all};
use crate::store::CacheStore;

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub refreshed: usize,
    pub failed: usize,
}

/// Caching façade over a remote paginated database API.
pub struct DataService {
    source: Arc<dyn RemoteSource>,
    cache: CacheStore,
    ignored: IgnoreList,
    fetch_lock: Mutex<()>,
    poll_interval: Duration,
    pub(crate) scheduler: Mutex<Option<SchedulerHandle>>,
}

impl DataService {
    /// Create a service with an empty cache and ignore list.
    pub fn new<I, S>(source: Arc<dyn RemoteSource>, poll_interval: Duration, known_databases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            source,
            cache: CacheStore::new(),
            ignored: IgnoreList::new(known_databases),
            fetch_lock: Mutex::new(()),
            poll_interval,
            scheduler: Mutex::new(None),
        }
    }

    pub fn from_config(source: Arc<dyn RemoteSource>, config: &AppConfig) -> Self {
        Self::new(source, config.poll_interval(), &config.known_databases)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn ignored(&self) -> &IgnoreList {
        &self.ignored
    }

    /// Serve `database_id` from cache, fetching it on a miss.
    ///
    /// # Errors
    ///
    /// - `Error::DatabaseIgnored` if a recent on-demand fetch of this database
    ///   failed; no remote call is made.
    /// - `Error::FetchFailed` if the fetch fails; the database is then added
    ///   to the ignore list unless it is a known database.
    pub async fn query_cached(&self, database_id: &str) -> Result<Records, Error> {
        validate_id(database_id)?;

        if let Some(records) = self.cache.get(database_id).await {
            tracing::debug!(database_id, "Database fetched from cache");
            return Ok(records);
        }

        let _fetching = self.fetch_lock.lock().await;

        if self.ignored.is_ignored(database_id).await {
            tracing::warn!(database_id, "Database is ignored after a recent failure, try again later");
            return Err(Error::DatabaseIgnored(database_id.to_string()));
        }

        // another waiter may have fetched it while we queued on the lock
        if let Some(records) = self.cache.get(database_id).await {
            return Ok(records);
        }

        tracing::warn!(database_id, "Cannot find database in cache, querying it");
        match self.query_database(database_id, true).await {
            Ok(records) => Ok(records),
            Err(e) => {
                self.ignored.mark_ignored(database_id).await;
                Err(e)
            }
        }
    }

    /// Fetch every page of `database_id` from the remote source.
    ///
    /// With `update_cache` set, a successful result replaces the cached entry.
    /// Failures are returned as-is and never touch the ignore list.
    pub async fn query_database(&self, database_id: &str, update_cache: bool) -> Result<Records, Error> {
        validate_id(database_id)?;

        let records = fetch_all(self.source.as_ref(), database_id)
            .await
            .map_err(|e| Error::fetch_failed(database_id, e))?;
        let records = Arc::new(records);

        if update_cache {
            self.cache.put(database_id, records.clone()).await;
        }

        tracing::info!(database_id, records = records.len(), "Fetched and processed database records");
        Ok(records)
    }

    /// Ids of every database currently cached.
    ///
    /// The remote API offers no reliable listing, so the managed set is
    /// whatever has been queried successfully and survived the last refresh.
    pub async fn list_known_databases(&self) -> Vec<String> {
        self.cache.list_keys().await
    }

    /// Databases visible to the credential, as reported by the remote source.
    pub async fn list_accessible_databases(&self) -> Result<BTreeMap<String, String>, Error> {
        self.source.list_databases().await.map_err(Error::list_failed)
    }

    /// Rebuild the cache from the currently cached ids.
    ///
    /// Databases that fail this cycle are dropped from the cache. The ignore
    /// list is not consulted or updated.
    pub async fn refresh(&self) -> RefreshReport {
        let database_ids = self.cache.list_keys().await;
        if database_ids.is_empty() {
            tracing::info!("No databases managed yet; a database is added when queried for the first time");
            return RefreshReport::default();
        }

        tracing::info!(databases = database_ids.len(), "Begin refresh of cached databases");

        let mut report = RefreshReport::default();
        let mut next = HashMap::with_capacity(database_ids.len());
        for database_id in database_ids {
            match self.query_database(&database_id, false).await {
                Ok(records) => {
                    next.insert(database_id, records);
                    report.refreshed += 1;
                }
                Err(e) => {
                    tracing::error!(database_id = %database_id, error = %e, "Failed to refresh database");
                    report.failed += 1;
                }
            }
        }

        self.cache.replace_all(next).await;

        tracing::info!(refreshed = report.refreshed, failed = report.failed, "Completed refresh of cached databases");
        report
    }

    /// Drop expired ignore-list entries.
    pub async fn sweep_ignored(&self) -> usize {
        self.ignored.sweep().await
    }
}

fn validate_id(database_id: &str) -> Result<(), Error> {
    if database_id.trim().is_empty() {
        return Err(Error::InvalidInput("database id cannot be empty".into()));
    }
    Ok(())
}
