//! Unified error types for the data service.
//!
//! Display strings carry a stable code prefix so the HTTP layer and logs can
//! tell the failure classes apart.

/// Failures reported by a [`RemoteSource`](crate::RemoteSource).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Credential rejected by the remote API.
    #[error("authentication failed: invalid access token")]
    Auth,

    /// Remote API rate limited the request.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Request did not complete in time.
    #[error("request timeout")]
    Timeout,

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The remote does not offer this capability.
    #[error("unsupported by remote source: {0}")]
    Unsupported(String),
}

/// Unified error type for the data service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty database id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// On-demand queries for this database are suppressed after a recent failure.
    #[error("DATABASE_IGNORED: the {0} database is ignored, try again later")]
    DatabaseIgnored(String),

    /// Fetching the database from the remote source failed.
    #[error("FETCH_FAILED: failed to query database {database_id}: {source}")]
    FetchFailed {
        database_id: String,
        #[source]
        source: SourceError,
    },

    /// Listing databases from the remote source failed.
    #[error("FETCH_FAILED: failed to list databases: {0}")]
    ListFailed(#[source] SourceError),

    /// Capability not available from the remote source.
    #[error("UNSUPPORTED: {0}")]
    Unsupported(String),
}

impl Error {
    pub(crate) fn fetch_failed(database_id: &str, source: SourceError) -> Self {
        match source {
            SourceError::Unsupported(msg) => Error::Unsupported(msg),
            source => Error::FetchFailed { database_id: database_id.to_string(), source },
        }
    }

    pub(crate) fn list_failed(source: SourceError) -> Self {
        match source {
            SourceError::Unsupported(msg) => Error::Unsupported(msg),
            source => Error::ListFailed(source),
        }
    }

    /// Whether the error is the ignore-list short circuit rather than a real failure.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Error::DatabaseIgnored(_))
    }
}
