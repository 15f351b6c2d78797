//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NOTION_DATA_*)
//! 2. TOML config file (if NOTION_DATA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::duration::parse_duration;

mod validation;

pub use validation::ConfigError;

/// Poll interval used when `poll_duration` cannot be parsed.
pub const FALLBACK_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NOTION_DATA_*)
/// 2. TOML config file (if NOTION_DATA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    ///
    /// Set via NOTION_DATA_HOST environment variable.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server binds to.
    ///
    /// Set via NOTION_DATA_PORT environment variable.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Notion integration token.
    ///
    /// Set via NOTION_DATA_NOTION_TOKEN environment variable.
    /// Required only when the server starts.
    #[serde(default)]
    pub notion_token: Option<String>,

    /// How often the cached databases are refreshed, e.g. `6h` or `15m`.
    ///
    /// Set via NOTION_DATA_POLL_DURATION environment variable.
    #[serde(default = "default_poll_duration")]
    pub poll_duration: String,

    /// Databases that are never placed on the ignore list.
    ///
    /// Set via NOTION_DATA_KNOWN_DATABASES environment variable (comma-separated).
    #[serde(default, deserialize_with = "string_or_list")]
    pub known_databases: Vec<String>,

    /// Notion REST API base URL.
    #[serde(default = "default_base_url")]
    pub notion_base_url: String,

    /// Value of the `Notion-Version` header.
    #[serde(default = "default_notion_version")]
    pub notion_version: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout for remote calls in milliseconds.
    ///
    /// Set via NOTION_DATA_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5432
}

fn default_poll_duration() -> String {
    "6h".into()
}

fn default_base_url() -> String {
    "https://api.notion.com/v1".into()
}

fn default_notion_version() -> String {
    "2022-06-28".into()
}

fn default_user_agent() -> String {
    "notion-data-service/0.1".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// Accept either a list or a single comma-separated string.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    let items = match Raw::deserialize(deserializer)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect(),
        Raw::Many(v) => v,
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            notion_token: None,
            poll_duration: default_poll_duration(),
            known_databases: Vec::new(),
            notion_base_url: default_base_url(),
            notion_version: default_notion_version(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Refresh interval, falling back to five minutes when `poll_duration` is unparsable.
    pub fn poll_interval(&self) -> Duration {
        match parse_duration(&self.poll_duration) {
            Ok(d) if !d.is_zero() => d,
            Ok(_) => {
                tracing::warn!(poll_duration = %self.poll_duration, "Poll duration is zero, using default of 5 minutes");
                FALLBACK_POLL_INTERVAL
            }
            Err(e) => {
                tracing::warn!(error = %e, poll_duration = %self.poll_duration, "Could not parse poll duration, using default of 5 minutes");
                FALLBACK_POLL_INTERVAL
            }
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NOTION_DATA_`
    /// 2. TOML file from `NOTION_DATA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NOTION_DATA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NOTION_DATA_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate from a prepared figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the Notion token is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the token is not set.
    pub fn require_notion_token(&self) -> Result<&str, ConfigError> {
        self.notion_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "notion_token".into(),
                hint: "Set NOTION_DATA_NOTION_TOKEN environment variable".into(),
            })
    }
}
