//! Client code for the Notion data service.
//!
//! This crate provides the Notion REST client used as the service's
//! [`RemoteSource`](ndata_core::RemoteSource) and the page normalizer that
//! flattens typed properties into strings.

pub mod normalize;
pub mod notion;

pub use normalize::{normalize_page, normalize_pages, normalize_properties};
pub use notion::{NotionClient, NotionConfig, NotionError, PropertyValue};
