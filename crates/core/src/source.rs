//! Remote paginated content source.
//!
//! The service only depends on this trait; the Notion REST client in
//! `ndata-client` is the production implementation.

use std::collections::BTreeMap;

use crate::error::SourceError;
use crate::record::Record;

/// Maximum number of records requested per page.
pub const PAGE_SIZE: u8 = 100;

/// One page of a database query.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<Record>,
    /// Cursor for the following page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// A remote database API that can be queried page by page.
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch one page of `database_id`, starting at `cursor` (`None` for the first page).
    async fn query_page(&self, database_id: &str, cursor: Option<&str>, page_size: u8) -> Result<Page, SourceError>;

    /// List databases the credential can see as `id -> title`.
    ///
    /// Best effort: sources without a listing capability keep this default.
    async fn list_databases(&self) -> Result<BTreeMap<String, String>, SourceError> {
        Err(SourceError::Unsupported("listing databases".into()))
    }
}

/// Fetch every page of `database_id` and concatenate them in page order.
///
/// Any page failure aborts the whole fetch; partial results are dropped.
pub async fn fetch_all(source: &dyn RemoteSource, database_id: &str) -> Result<Vec<Record>, SourceError> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source
            .query_page(database_id, cursor.as_deref(), PAGE_SIZE)
            .await
            .inspect_err(|e| {
                tracing::error!(database_id, cursor = ?cursor, error = %e, "Failed to query database page");
            })?;

        records.extend(page.records);

        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(records)
}
