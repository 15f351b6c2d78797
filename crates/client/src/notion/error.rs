//! Notion API client error types.

use std::sync::Arc;

use ndata_core::SourceError;

/// Errors from the Notion API client.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    /// No integration token configured.
    #[error("missing access token: NOTION_DATA_NOTION_TOKEN not set")]
    MissingToken,

    /// Base URL cannot be used to build endpoints.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Request parameters out of range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (invalid token or no access to the database).
    #[error("authentication failed: invalid access token")]
    AuthError,

    /// Rate limited by the Notion API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NotionError::Timeout } else { NotionError::Network(Arc::new(err)) }
    }
}

impl From<NotionError> for SourceError {
    fn from(err: NotionError) -> Self {
        match err {
            NotionError::AuthError | NotionError::MissingToken => SourceError::Auth,
            NotionError::RateLimited => SourceError::RateLimited,
            NotionError::HttpError { status } => SourceError::Http { status },
            NotionError::Timeout => SourceError::Timeout,
            NotionError::Parse(msg) => SourceError::Parse(msg),
            e @ (NotionError::Network(_) | NotionError::InvalidBaseUrl(_) | NotionError::InvalidRequest(_)) => {
                SourceError::Network(e.to_string())
            }
        }
    }
}
