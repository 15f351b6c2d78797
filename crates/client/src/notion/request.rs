//! Notion API request bodies and validation.

use serde::Serialize;

use super::NotionError;

/// Largest page size the Notion API accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Body of `POST /databases/{id}/query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    /// Cursor from the previous page; omitted for the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,

    /// Number of results (1-100).
    pub page_size: u8,
}

/// Body of `POST /search`, restricted to database objects.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub filter: SearchFilter,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,

    pub page_size: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchFilter {
    pub property: &'static str,
    pub value: &'static str,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self { start_cursor: None, page_size: MAX_PAGE_SIZE }
    }
}

impl QueryRequest {
    pub fn new(start_cursor: Option<&str>, page_size: u8) -> Self {
        Self { start_cursor: start_cursor.map(str::to_string), page_size }
    }

    /// Validate the request parameters.
    pub fn validate(&self) -> Result<(), NotionError> {
        validate_page_size(self.page_size)?;

        if let Some(cursor) = &self.start_cursor
            && cursor.trim().is_empty()
        {
            return Err(NotionError::InvalidRequest("start_cursor cannot be blank".into()));
        }

        Ok(())
    }
}

impl SearchRequest {
    pub fn databases(start_cursor: Option<String>) -> Self {
        Self {
            filter: SearchFilter { property: "object", value: "database" },
            start_cursor,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

fn validate_page_size(page_size: u8) -> Result<(), NotionError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(NotionError::InvalidRequest(format!(
            "page_size must be 1-{MAX_PAGE_SIZE}, got {page_size}"
        )));
    }
    Ok(())
}
