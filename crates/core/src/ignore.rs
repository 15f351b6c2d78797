//! Temporary suppression of databases whose on-demand fetch failed.
//!
//! Entries are keyed by the normalized id so `abc-123`, `abc123` and
//! `abc 123` share one entry. Known databases are never suppressed.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// How long a failed database is skipped by on-demand queries.
pub const IGNORE_WINDOW: Duration = Duration::from_secs(5 * 60);

/// How often expired entries are swept.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Strip spaces and `-` separators. Case is preserved.
pub fn normalize_database_id(database_id: &str) -> String {
    database_id.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Map from normalized database id to the time of its last failure.
#[derive(Debug)]
pub struct IgnoreList {
    entries: RwLock<HashMap<String, Instant>>,
    known: HashSet<String>,
}

impl IgnoreList {
    /// Create an empty list exempting `known_databases`.
    pub fn new<I, S>(known_databases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known = known_databases
            .into_iter()
            .map(|id| normalize_database_id(id.as_ref()))
            .collect();
        Self { entries: RwLock::new(HashMap::new()), known }
    }

    /// Whether `database_id` is configured as known.
    pub fn is_known(&self, database_id: &str) -> bool {
        self.known.contains(&normalize_database_id(database_id))
    }

    /// True while a failure for `database_id` is still inside the window.
    pub async fn is_ignored(&self, database_id: &str) -> bool {
        let key = normalize_database_id(database_id);
        match self.entries.read().await.get(&key) {
            Some(failed_at) => Instant::now() < *failed_at + IGNORE_WINDOW,
            None => false,
        }
    }

    /// Record a failure for `database_id` now, replacing any earlier entry.
    ///
    /// Returns false without touching the map for known databases.
    pub async fn mark_ignored(&self, database_id: &str) -> bool {
        let key = normalize_database_id(database_id);
        if self.known.contains(&key) {
            tracing::debug!(database_id, "Known database failed; not adding to ignored set");
            return false;
        }

        self.entries.write().await.insert(key, Instant::now());
        tracing::info!(database_id, "Database added to ignored set");
        true
    }

    /// Remove every entry whose window has elapsed. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|database_id, failed_at| {
            let live = now < *failed_at + IGNORE_WINDOW;
            if !live {
                tracing::info!(database_id = %database_id, "Removing database from ignored set");
            }
            live
        });

        before - entries.len()
    }

    /// Number of entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn failed_at(&self, database_id: &str) -> Option<Instant> {
        self.entries.read().await.get(&normalize_database_id(database_id)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_database_id() {
        assert_eq!(normalize_database_id("abc-123"), "abc123");
        assert_eq!(normalize_database_id("abc 123"), "abc123");
        assert_eq!(normalize_database_id(" a-b c-d "), "abcd");
        assert_eq!(normalize_database_id("ABC-def"), "ABCdef");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_then_ignored_within_window() {
        let list = IgnoreList::new(Vec::<String>::new());
        assert!(!list.is_ignored("db").await);

        assert!(list.mark_ignored("db").await);
        assert!(list.is_ignored("db").await);

        tokio::time::advance(IGNORE_WINDOW - Duration::from_secs(1)).await;
        assert!(list.is_ignored("db").await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!list.is_ignored("db").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_normalization_equivalence() {
        for failed in ["abc-123", "abc123", "abc 123"] {
            let list = IgnoreList::new(Vec::<String>::new());
            list.mark_ignored(failed).await;

            for probe in ["abc-123", "abc123", "abc 123"] {
                assert!(list.is_ignored(probe).await, "{probe} after failure of {failed}");
            }
            assert!(!list.is_ignored("ABC123").await);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_known_database_exempt() {
        let list = IgnoreList::new(["abc-123"]);

        for _ in 0..3 {
            assert!(!list.mark_ignored("abc 123").await);
            assert!(!list.mark_ignored("abc123").await);
        }

        assert!(!list.is_ignored("abc-123").await);
        assert!(list.is_empty().await);
        assert!(list.is_known("abc123"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_overwrites_earlier_failure() {
        let list = IgnoreList::new(Vec::<String>::new());
        list.mark_ignored("db").await;
        let first = list.failed_at("db").await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        list.mark_ignored("db").await;
        let second = list.failed_at("db").await.unwrap();

        assert_eq!(second - first, Duration::from_secs(60));
        assert_eq!(list.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let list = IgnoreList::new(Vec::<String>::new());
        list.mark_ignored("old").await;

        tokio::time::advance(Duration::from_secs(4 * 60)).await;
        list.mark_ignored("fresh").await;
        let fresh_at = list.failed_at("fresh").await;

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(list.sweep().await, 1);

        assert!(list.failed_at("old").await.is_none());
        assert_eq!(list.failed_at("fresh").await, fresh_at);
        assert!(list.is_ignored("fresh").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_empty() {
        let list = IgnoreList::new(Vec::<String>::new());
        assert_eq!(list.sweep().await, 0);
    }
}
