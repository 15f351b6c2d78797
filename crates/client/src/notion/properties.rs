//! Typed Notion property payloads and their printable values.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A page property, tagged by its `type` field.
///
/// Kinds this service does not understand decode to `Unsupported` and yield
/// no values.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Date { date: Option<DateRange> },
    Select { select: Option<SelectOption> },
    MultiSelect { multi_select: Vec<SelectOption> },
    Url { url: Option<String> },
    Checkbox { checkbox: bool },
    Email { email: Option<String> },
    PhoneNumber { phone_number: Option<String> },
    Formula { formula: FormulaValue },
    Number { number: Option<f64> },
    CreatedTime { created_time: DateTime<Utc> },
    LastEditedTime { last_edited_time: DateTime<Utc> },
    CreatedBy { created_by: User },
    LastEditedBy { last_edited_by: User },
    People { people: Vec<User> },
    #[serde(other)]
    Unsupported,
}

/// Result of a formula property.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateRange> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateRange {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: Option<String>,
}

impl PropertyValue {
    /// Flatten the payload into printable values, preserving Notion's ordering.
    pub fn values(&self) -> Vec<String> {
        match self {
            PropertyValue::Title { title } => {
                vec![title.iter().map(|t| t.plain_text.as_str()).collect()]
            }
            PropertyValue::RichText { rich_text } => rich_text.iter().map(|t| t.plain_text.clone()).collect(),
            PropertyValue::Date { date } => date.as_ref().map(DateRange::values).unwrap_or_default(),
            PropertyValue::Select { select } => select.iter().map(|o| o.name.clone()).collect(),
            PropertyValue::MultiSelect { multi_select } => multi_select.iter().map(|o| o.name.clone()).collect(),
            PropertyValue::Url { url } => url.iter().cloned().collect(),
            PropertyValue::Checkbox { checkbox } => vec![checkbox.to_string()],
            PropertyValue::Email { email } => email.iter().cloned().collect(),
            PropertyValue::PhoneNumber { phone_number } => phone_number.iter().cloned().collect(),
            PropertyValue::Formula { formula } => formula.values(),
            PropertyValue::Number { number } => number.iter().map(|n| format_number(*n)).collect(),
            PropertyValue::CreatedTime { created_time } => vec![created_time.timestamp().to_string()],
            PropertyValue::LastEditedTime { last_edited_time } => vec![last_edited_time.timestamp().to_string()],
            PropertyValue::CreatedBy { created_by } => created_by.name.iter().cloned().collect(),
            PropertyValue::LastEditedBy { last_edited_by } => last_edited_by.name.iter().cloned().collect(),
            PropertyValue::People { people } => people.iter().filter_map(|p| p.name.clone()).collect(),
            PropertyValue::Unsupported => Vec::new(),
        }
    }
}

impl FormulaValue {
    fn values(&self) -> Vec<String> {
        match self {
            FormulaValue::String { string } => string.iter().cloned().collect(),
            FormulaValue::Number { number } => number.iter().map(|n| format_number(*n)).collect(),
            FormulaValue::Boolean { boolean } => boolean.iter().map(bool::to_string).collect(),
            FormulaValue::Date { date } => date.iter().map(|d| d.start.clone()).collect(),
            FormulaValue::Unsupported => Vec::new(),
        }
    }
}

impl DateRange {
    fn values(&self) -> Vec<String> {
        std::iter::once(self.start.clone()).chain(self.end.clone()).collect()
    }
}

fn format_number(n: f64) -> String {
    format!("{n:.5}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(payload: serde_json::Value) -> Vec<String> {
        serde_json::from_value::<PropertyValue>(payload).unwrap().values()
    }

    #[test]
    fn test_title_joins_segments() {
        let v = values(json!({"type": "title", "title": [{"plain_text": "Hello "}, {"plain_text": "world"}]}));
        assert_eq!(v, vec!["Hello world"]);
    }

    #[test]
    fn test_rich_text_keeps_segments() {
        let v = values(json!({"type": "rich_text", "rich_text": [{"plain_text": "a"}, {"plain_text": "b"}]}));
        assert_eq!(v, vec!["a", "b"]);
    }

    #[test]
    fn test_date_start_and_end() {
        let v = values(json!({"type": "date", "date": {"start": "2024-01-01", "end": "2024-01-31"}}));
        assert_eq!(v, vec!["2024-01-01", "2024-01-31"]);

        let v = values(json!({"type": "date", "date": {"start": "2024-01-01", "end": null}}));
        assert_eq!(v, vec!["2024-01-01"]);

        assert!(values(json!({"type": "date", "date": null})).is_empty());
    }

    #[test]
    fn test_select_and_multi_select() {
        assert_eq!(values(json!({"type": "select", "select": {"name": "Done"}})), vec!["Done"]);
        assert!(values(json!({"type": "select", "select": null})).is_empty());

        let v = values(json!({"type": "multi_select", "multi_select": [{"name": "x"}, {"name": "y"}]}));
        assert_eq!(v, vec!["x", "y"]);
    }

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(values(json!({"type": "url", "url": "https://a.b"})), vec!["https://a.b"]);
        assert_eq!(values(json!({"type": "checkbox", "checkbox": false})), vec!["false"]);
        assert_eq!(values(json!({"type": "email", "email": "a@b.c"})), vec!["a@b.c"]);
        assert_eq!(values(json!({"type": "phone_number", "phone_number": "+1 555"})), vec!["+1 555"]);
        assert_eq!(values(json!({"type": "number", "number": 3.5})), vec!["3.50000"]);
        assert!(values(json!({"type": "number", "number": null})).is_empty());
    }

    #[test]
    fn test_formula_variants() {
        let v = values(json!({"type": "formula", "formula": {"type": "string", "string": "ok"}}));
        assert_eq!(v, vec!["ok"]);
        let v = values(json!({"type": "formula", "formula": {"type": "number", "number": 2}}));
        assert_eq!(v, vec!["2.00000"]);
        let v = values(json!({"type": "formula", "formula": {"type": "boolean", "boolean": true}}));
        assert_eq!(v, vec!["true"]);
        let v = values(json!({"type": "formula", "formula": {"type": "date", "date": {"start": "2024-05-01"}}}));
        assert_eq!(v, vec!["2024-05-01"]);
    }

    #[test]
    fn test_timestamps_as_unix_seconds() {
        let v = values(json!({"type": "created_time", "created_time": "2021-01-01T00:00:00.000Z"}));
        assert_eq!(v, vec!["1609459200"]);
        let v = values(json!({"type": "last_edited_time", "last_edited_time": "2021-01-01T00:01:00.000Z"}));
        assert_eq!(v, vec!["1609459260"]);
    }

    #[test]
    fn test_people_kinds() {
        let v = values(json!({"type": "created_by", "created_by": {"object": "user", "name": "Ada"}}));
        assert_eq!(v, vec!["Ada"]);
        let v = values(json!({"type": "last_edited_by", "last_edited_by": {"object": "user"}}));
        assert!(v.is_empty());
        let v = values(json!({"type": "people", "people": [{"name": "Ada"}, {"id": "bot"}, {"name": "Lin"}]}));
        assert_eq!(v, vec!["Ada", "Lin"]);
    }

    #[test]
    fn test_unknown_kind_yields_nothing() {
        let v = values(json!({"type": "relation", "relation": [{"id": "x"}]}));
        assert!(v.is_empty());
    }
}
