//! Core types and shared functionality for the Notion data service.
//!
//! This crate provides:
//! - The normalized record model
//! - In-memory cache store and ignore list
//! - The cached query service and its background loops
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod duration;
pub mod error;
pub mod ignore;
pub mod record;
mod scheduler;
pub mod service;
pub mod source;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, ConfigError};
pub use error::{Error, SourceError};
pub use ignore::{CLEANUP_INTERVAL, IGNORE_WINDOW, IgnoreList, normalize_database_id};
pub use record::{Property, Record, Records};
pub use service::{DataService, RefreshReport};
pub use source::{PAGE_SIZE, Page, RemoteSource, fetch_all};
pub use store::CacheStore;
