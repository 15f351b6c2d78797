//! Notion REST API client.
//!
//! Implements [`RemoteSource`] on top of the database query endpoint.
//!
//! ### Protocol
//!
//! - **Endpoint**: `POST {base}/databases/{id}/query`, `POST {base}/search`
//! - **Authentication**: `Authorization: Bearer <token>` plus `Notion-Version`.
//! - **Pagination**: up to 100 results per request, continued with
//!   `start_cursor` until `next_cursor` is null.
//! - **Timeouts**: every request is bounded by the configured timeout.

pub mod error;
pub mod properties;
pub mod request;
pub mod response;

pub use error::NotionError;
pub use properties::PropertyValue;
pub use request::{QueryRequest, SearchRequest};
pub use response::{QueryResponse, SearchResponse};

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use ndata_core::{AppConfig, Page, RemoteSource, SourceError};
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::normalize::normalize_pages;

/// Notion client configuration.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token.
    pub token: String,
    /// Base URL (default: https://api.notion.com/v1).
    pub base_url: String,
    pub notion_version: String,
    /// Request timeout (default: 30s).
    pub timeout: Duration,
    pub user_agent: String,
}

/// Same defaults as [`AppConfig`], without a token.
impl Default for NotionConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        let timeout = app.timeout();
        Self {
            token: String::new(),
            base_url: app.notion_base_url,
            notion_version: app.notion_version,
            timeout,
            user_agent: app.user_agent,
        }
    }
}

impl NotionConfig {
    /// Build from application configuration. Fails if no token is set.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotionError> {
        let token = config.require_notion_token().map_err(|_| NotionError::MissingToken)?;

        Ok(Self {
            token: token.to_string(),
            base_url: config.notion_base_url.clone(),
            notion_version: config.notion_version.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Notion API client.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    config: NotionConfig,
    base_url: Url,
}

impl NotionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NotionConfig) -> Result<Self, NotionError> {
        if config.token.is_empty() {
            return Err(NotionError::MissingToken);
        }

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| NotionError::InvalidBaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(NotionError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self { http, config, base_url })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotionError> {
        Self::new(NotionConfig::from_app_config(config)?)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    /// URL of `segments` appended to the base URL, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, NotionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NotionError::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Query one page of a database.
    pub async fn query_database(&self, database_id: &str, req: &QueryRequest) -> Result<QueryResponse, NotionError> {
        req.validate()?;
        let url = self.endpoint(&["databases", database_id, "query"])?;

        tracing::debug!(database_id, cursor = ?req.start_cursor, "querying Notion database");
        self.post(url, req).await
    }

    /// Search one page of databases shared with the integration.
    pub async fn search_databases(&self, start_cursor: Option<String>) -> Result<SearchResponse, NotionError> {
        let url = self.endpoint(&["search"])?;
        self.post(url, &SearchRequest::databases(start_cursor)).await
    }

    async fn post<B, R>(&self, url: Url, body: &B) -> Result<R, NotionError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let start = Instant::now();

        let http_response = self
            .http
            .post(url.clone())
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.notion_version)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("Notion API response status: {}", status);

        if status == 401 || status == 403 {
            return Err(NotionError::AuthError);
        }

        if status == 429 {
            return Err(NotionError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(NotionError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let parsed = serde_json::from_slice(&bytes).map_err(|e| NotionError::Parse(e.to_string()))?;

        tracing::debug!("POST {} completed in {:?} ({} bytes)", url.path(), start.elapsed(), bytes.len());
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl RemoteSource for NotionClient {
    async fn query_page(&self, database_id: &str, cursor: Option<&str>, page_size: u8) -> Result<Page, SourceError> {
        let req = QueryRequest::new(cursor, page_size);
        let resp = self.query_database(database_id, &req).await?;

        let next_cursor = resp.continuation().map(str::to_string);
        Ok(Page { records: normalize_pages(resp.results), next_cursor })
    }

    async fn list_databases(&self) -> Result<BTreeMap<String, String>, SourceError> {
        let mut databases = BTreeMap::new();
        let mut cursor = None;

        loop {
            let resp = self.search_databases(cursor.take()).await?;
            let next = resp.continuation().map(str::to_string);

            for db in resp.results {
                let title = db.plain_title();
                databases.insert(db.id, title);
            }

            match next {
                Some(c) => cursor = Some(c),
                None => break,
            }
        }

        Ok(databases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NotionClient {
        NotionClient::new(NotionConfig { token: "secret".into(), ..Default::default() }).unwrap()
    }

    #[test]
    fn test_client_new_missing_token() {
        let result = NotionClient::new(NotionConfig::default());
        assert!(matches!(result, Err(NotionError::MissingToken)));
    }

    #[test]
    fn test_client_invalid_base_url() {
        let config = NotionConfig { token: "t".into(), base_url: "not a url".into(), ..Default::default() };
        assert!(matches!(NotionClient::new(config), Err(NotionError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_query_endpoint() {
        let url = client()
            .endpoint(&["databases", "2a3b4c5d-1111", "query"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.notion.com/v1/databases/2a3b4c5d-1111/query");
    }

    #[test]
    fn test_endpoint_encodes_database_id() {
        let url = client().endpoint(&["databases", "abc 123/x", "query"]).unwrap();
        assert_eq!(url.as_str(), "https://api.notion.com/v1/databases/abc%20123%2Fx/query");
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let config = NotionConfig {
            token: "t".into(),
            base_url: "http://localhost:8080/v1/".into(),
            ..Default::default()
        };
        let url = NotionClient::new(config).unwrap().endpoint(&["search"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/search");
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig { notion_token: Some("tok".into()), timeout_ms: 1500, ..Default::default() };
        let config = NotionConfig::from_app_config(&app).unwrap();
        assert_eq!(config.token, "tok");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.base_url, "https://api.notion.com/v1");

        let missing = NotionConfig::from_app_config(&AppConfig::default());
        assert!(matches!(missing, Err(NotionError::MissingToken)));
    }

    #[test]
    fn test_default_config_matches_app_defaults() {
        let config = NotionConfig::default();
        let app = AppConfig::default();
        assert!(config.token.is_empty());
        assert_eq!(config.base_url, app.notion_base_url);
        assert_eq!(config.notion_version, "2022-06-28");
        assert_eq!(config.user_agent, app.user_agent);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_invalid_page_size_rejected_before_request() {
        let err = client().query_page("db", None, 0).await.unwrap_err();
        assert!(matches!(err, SourceError::Network(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let config = NotionConfig {
            token: "t".into(),
            base_url: "http://127.0.0.1:9/v1".into(),
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let client = NotionClient::new(config).unwrap();

        let err = client.query_page("db", None, 100).await.unwrap_err();
        assert!(matches!(err, SourceError::Network(_) | SourceError::Timeout));
    }
}
