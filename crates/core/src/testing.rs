//! Scripted in-memory [`RemoteSource`] for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::error::SourceError;
use crate::record::{Property, Record};
use crate::source::{Page, RemoteSource};

pub(crate) fn record(id: &str) -> Record {
    Record {
        id: id.to_string(),
        properties: vec![Property::new("Name", vec![id.to_string()])],
        last_updated: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// Serves pages per database id, counting calls and overlapping invocations.
#[derive(Default)]
pub(crate) struct MockSource {
    pages: Mutex<HashMap<String, Vec<Vec<Record>>>>,
    fail_at: Mutex<HashMap<String, usize>>,
    cursors: Mutex<HashMap<String, Vec<Option<String>>>>,
    page_sizes: Mutex<Vec<u8>>,
    listing: Mutex<Option<BTreeMap<String, String>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    pub(crate) fn set_pages(&self, database_id: &str, pages: Vec<Vec<Record>>) {
        self.pages.lock().unwrap().insert(database_id.to_string(), pages);
    }

    /// Fail the `page`-th request (0-based) of every fetch of `database_id`.
    pub(crate) fn fail_on_page(&self, database_id: &str, page: usize) {
        self.fail_at.lock().unwrap().insert(database_id.to_string(), page);
    }

    pub(crate) fn fail_database(&self, database_id: &str) {
        self.fail_on_page(database_id, 0);
    }

    pub(crate) fn recover(&self, database_id: &str) {
        self.fail_at.lock().unwrap().remove(database_id);
    }

    pub(crate) fn set_listing(&self, listing: BTreeMap<String, String>) {
        *self.listing.lock().unwrap() = Some(listing);
    }

    /// Total page requests.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches started for `database_id` (first-page requests).
    pub(crate) fn fetches(&self, database_id: &str) -> usize {
        self.cursors(database_id).iter().filter(|c| c.is_none()).count()
    }

    pub(crate) fn cursors(&self, database_id: &str) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().get(database_id).cloned().unwrap_or_default()
    }

    pub(crate) fn page_sizes(&self) -> Vec<u8> {
        self.page_sizes.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RemoteSource for MockSource {
    async fn query_page(&self, database_id: &str, cursor: Option<&str>, page_size: u8) -> Result<Page, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.cursors
            .lock()
            .unwrap()
            .entry(database_id.to_string())
            .or_default()
            .push(cursor.map(str::to_string));
        self.page_sizes.lock().unwrap().push(page_size);

        let index = match cursor {
            None => 0,
            Some(c) => c.rsplit(':').next().and_then(|n| n.parse().ok()).unwrap_or(usize::MAX),
        };

        let result = if self.fail_at.lock().unwrap().get(database_id) == Some(&index) {
            Err(SourceError::Http { status: 500 })
        } else {
            let pages = self.pages.lock().unwrap();
            match pages.get(database_id).and_then(|p| p.get(index).map(|records| (records, p.len()))) {
                Some((records, total)) => Ok(Page {
                    records: records.clone(),
                    next_cursor: (index + 1 < total).then(|| format!("{database_id}:{}", index + 1)),
                }),
                None => Err(SourceError::Http { status: 404 }),
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn list_databases(&self) -> Result<BTreeMap<String, String>, SourceError> {
        self.listing
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::Unsupported("listing databases".into()))
    }
}
