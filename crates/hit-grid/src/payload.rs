//! The grid job success payload.

use std::collections::BTreeMap;

use map_common::PropertyValue;
use serde::{Deserialize, Serialize};

use crate::codepoint::CodepointAllocator;

/// Result of a grid render: the encoded grid, the ordered key array, and
/// (when requested) per-join-value feature attributes.
///
/// Serializes to the wire shape consumers expect:
/// `{ "grid": [...], "keys": [...], "data": {...} }` with `data` omitted
/// when features were not requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPayload {
    /// One string per output row; all rows have equal character length.
    pub grid: Vec<String>,
    /// Join values in code-unit assignment order.
    pub keys: Vec<String>,
    /// Attribute maps keyed by join value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, BTreeMap<String, PropertyValue>>>,
}

impl GridPayload {
    /// Decode the join value at a grid cell, the inverse of encoding.
    ///
    /// This is the hover/click lookup: no second spatial query needed.
    /// Returns `None` for out-of-range coordinates or a corrupted grid.
    pub fn key_at(&self, x: usize, y: usize) -> Option<&str> {
        let row = self.grid.get(y)?;
        let code = row.chars().nth(x)?;
        let index = CodepointAllocator::decode_index(code)?;
        self.keys.get(index).map(String::as_str)
    }

    /// Attributes for the feature at a grid cell, if feature data was
    /// collected and the cell is covered by a feature with a non-empty
    /// join value.
    pub fn data_at(&self, x: usize, y: usize) -> Option<&BTreeMap<String, PropertyValue>> {
        let key = self.key_at(x, y)?;
        if key.is_empty() {
            return None;
        }
        self.data.as_ref()?.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> GridPayload {
        // 2x2 grid: top row empty, bottom row covered by "A".
        // Code units: "" -> 32 (space), "A" -> 33 (!).
        let mut props = BTreeMap::new();
        props.insert("NAME".to_string(), PropertyValue::String("A".into()));
        let mut data = BTreeMap::new();
        data.insert("A".to_string(), props);

        GridPayload {
            grid: vec!["  ".to_string(), "!!".to_string()],
            keys: vec!["".to_string(), "A".to_string()],
            data: Some(data),
        }
    }

    #[test]
    fn test_key_at() {
        let payload = sample_payload();
        assert_eq!(payload.key_at(0, 0), Some(""));
        assert_eq!(payload.key_at(1, 1), Some("A"));
        assert_eq!(payload.key_at(2, 0), None);
        assert_eq!(payload.key_at(0, 2), None);
    }

    #[test]
    fn test_data_at() {
        let payload = sample_payload();
        assert!(payload.data_at(0, 0).is_none());
        let attrs = payload.data_at(0, 1).unwrap();
        assert_eq!(
            attrs.get("NAME"),
            Some(&PropertyValue::String("A".to_string()))
        );
    }

    #[test]
    fn test_data_field_omitted_when_absent() {
        let payload = GridPayload {
            grid: vec![" ".to_string()],
            keys: vec!["".to_string()],
            data: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("data"));

        let with_data = sample_payload();
        let json = serde_json::to_string(&with_data).unwrap();
        assert!(json.contains("\"data\""));
    }
}
