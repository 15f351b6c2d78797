//! Conversion of Notion pages into [`Record`]s.

use ndata_core::{Property, Record};
use serde_json::{Map, Value};

use crate::notion::properties::PropertyValue;
use crate::notion::response::PageObject;

/// Normalize one page. Undecodable properties yield no values.
pub fn normalize_page(page: PageObject) -> Record {
    Record::new(&page.id, normalize_properties(page.properties), page.last_edited_time)
}

pub fn normalize_pages(pages: Vec<PageObject>) -> Vec<Record> {
    pages.into_iter().map(normalize_page).collect()
}

/// Flatten raw properties, keeping their remote order.
pub fn normalize_properties(properties: Map<String, Value>) -> Vec<Property> {
    properties
        .into_iter()
        .map(|(name, raw)| {
            let value = serde_json::from_value::<PropertyValue>(raw).unwrap_or_else(|e| {
                tracing::debug!(property = %name, error = %e, "Undecodable property payload");
                PropertyValue::Unsupported
            });
            Property::new(name, value.values())
        })
        .collect()
}
