//! Item payload construction
//!
//! Maps an event's properties onto the Gorse item schema. Missing or
//! malformed properties become empty strings; payload completeness is the
//! destination's concern, not the relay's.

use contracts::Event;
use serde::{Deserialize, Serialize};

/// Outbound item payload (Gorse `/api/item/` schema)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemPayload {
    /// Single-element list holding the item category
    pub categories: Vec<String>,

    /// Stringified item price
    pub comment: String,

    /// Visibility flag, always true
    pub is_hidden: bool,

    /// `"<item_type>_<item_id>"`
    pub item_id: String,

    /// Single-element list holding the item display name
    pub labels: Vec<String>,

    /// RFC 3339 event timestamp, empty when the event carried none
    pub timestamp: String,
}

impl ItemPayload {
    /// Build a payload from an event's properties
    pub fn from_event(event: &Event) -> Self {
        let item_type = event.property_str("item_type").unwrap_or_default();
        let item_id = event.property_str("item_id").unwrap_or_default();

        Self {
            categories: vec![event.property_str("item_category").unwrap_or_default()],
            comment: event.property_str("item_price").unwrap_or_default(),
            is_hidden: true,
            item_id: format!("{item_type}_{item_id}"),
            labels: vec![event.property_str("item_name").unwrap_or_default()],
            timestamp: event
                .timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn purchase_event() -> Event {
        let mut event = Event::new("purchase");
        event.timestamp = Some(Utc.with_ymd_and_hms(2023, 4, 2, 12, 30, 0).unwrap());
        for (key, value) in [
            ("item_type", json!("shirt")),
            ("item_id", json!("sku-42")),
            ("item_category", json!("apparel")),
            ("item_price", json!(19.99)),
            ("item_name", json!("Blue Shirt")),
        ] {
            event.properties.insert(key.to_string(), value);
        }
        event
    }

    #[test]
    fn test_builds_full_payload() {
        let payload = ItemPayload::from_event(&purchase_event());

        assert_eq!(payload.item_id, "shirt_sku-42");
        assert_eq!(payload.categories, vec!["apparel"]);
        assert_eq!(payload.labels, vec!["Blue Shirt"]);
        assert_eq!(payload.comment, "19.99");
        assert!(payload.is_hidden);
        assert!(payload.timestamp.starts_with("2023-04-02T12:30:00"));
    }

    #[test]
    fn test_missing_properties_become_empty() {
        let payload = ItemPayload::from_event(&Event::new("purchase"));

        assert_eq!(payload.item_id, "_");
        assert_eq!(payload.categories, vec![""]);
        assert_eq!(payload.labels, vec![""]);
        assert_eq!(payload.comment, "");
        assert_eq!(payload.timestamp, "");
        assert!(payload.is_hidden);
    }

    #[test]
    fn test_wire_field_names_are_pascal_case() {
        let payload = ItemPayload::from_event(&purchase_event());
        let value: Value = serde_json::to_value(&payload).unwrap();

        let object = value.as_object().unwrap();
        for key in [
            "Categories",
            "Comment",
            "IsHidden",
            "ItemId",
            "Labels",
            "Timestamp",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
        assert_eq!(object.len(), 6);
    }

    #[test]
    fn test_untrusted_values_are_escaped_by_the_encoder() {
        let mut event = Event::new("purchase");
        event
            .properties
            .insert("item_name".to_string(), json!("a\"b\\c"));

        let payload = ItemPayload::from_event(&event);
        let body = serde_json::to_string(&payload).unwrap();

        // The raw quote must not terminate the JSON string
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["Labels"][0], "a\"b\\c");
    }
}
