//! Event - the inbound record forwarded by the relay
//!
//! Shape mirrors the host's event delivery payload: a type name, an optional
//! timestamp, and a free-form properties map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound application event
///
/// Immutable once received; ownership moves from the source into the buffer
/// on `add`, and from the buffer into the sink during a flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event type name (e.g., "purchase"), matched against the allow-list
    pub event: String,

    /// Producer-supplied timestamp, if any
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Free-form event properties
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl Event {
    /// Create an event with no timestamp and no properties
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            timestamp: None,
            properties: HashMap::new(),
        }
    }

    /// JSON-serialized byte length of the whole event
    ///
    /// Computed once at ingestion time and carried alongside the event; the
    /// buffer never re-serializes.
    pub fn serialized_size(&self) -> usize {
        serde_json::to_vec(self).map(|body| body.len()).unwrap_or(0)
    }

    /// Look up a property and render it as a string
    ///
    /// String values are returned verbatim; other values are rendered as
    /// compact JSON. Missing properties come back as `None`.
    pub fn property_str(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_size_matches_json() {
        let mut event = Event::new("purchase");
        event
            .properties
            .insert("item_id".to_string(), Value::from("sku-1"));

        let expected = serde_json::to_vec(&event).unwrap().len();
        assert_eq!(event.serialized_size(), expected);
        assert!(event.serialized_size() > 0);
    }

    #[test]
    fn test_property_str_rendering() {
        let mut event = Event::new("purchase");
        event
            .properties
            .insert("name".to_string(), Value::from("Blue Shirt"));
        event.properties.insert("price".to_string(), Value::from(19.99));

        assert_eq!(event.property_str("name").as_deref(), Some("Blue Shirt"));
        assert_eq!(event.property_str("price").as_deref(), Some("19.99"));
        assert_eq!(event.property_str("missing"), None);
    }

    #[test]
    fn test_deserialize_defaults() {
        let event: Event = serde_json::from_str(r#"{"event":"view"}"#).unwrap();
        assert_eq!(event.event, "view");
        assert!(event.timestamp.is_none());
        assert!(event.properties.is_empty());
    }
}
