//! Notion API response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::properties::RichText;

/// Response of `POST /databases/{id}/query`.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<PageObject>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// One database row.
///
/// Properties stay as raw JSON in remote order; each one is decoded on its
/// own during normalization so a malformed property cannot fail the page.
/// A missing or null `last_edited_time` reads as the Unix epoch.
#[derive(Debug, Deserialize)]
pub struct PageObject {
    pub id: String,
    #[serde(default, deserialize_with = "nullable_timestamp")]
    pub last_edited_time: DateTime<Utc>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Response of `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<DatabaseObject>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseObject {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
}

impl QueryResponse {
    /// Cursor of the next page, `None` when this is the last one.
    pub fn continuation(&self) -> Option<&str> {
        continuation(self.has_more, self.next_cursor.as_deref())
    }
}

impl SearchResponse {
    pub fn continuation(&self) -> Option<&str> {
        continuation(self.has_more, self.next_cursor.as_deref())
    }
}

impl DatabaseObject {
    pub fn plain_title(&self) -> String {
        self.title.iter().map(|t| t.plain_text.as_str()).collect()
    }
}

fn nullable_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_default())
}

fn continuation(has_more: bool, cursor: Option<&str>) -> Option<&str> {
    match cursor {
        Some(c) if !c.is_empty() => Some(c),
        _ => {
            if has_more {
                tracing::warn!("Notion reported more results without a cursor; stopping pagination");
            }
            None
        }
    }
}
