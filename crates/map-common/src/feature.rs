//! Feature and attribute value model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// A scalar attribute value attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// String form used as a grid join value. Matches how attribute values
    /// are keyed in the output `data` map.
    pub fn to_join_string(&self) -> String {
        match self {
            PropertyValue::Null => String::new(),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Float(f) => f.to_string(),
            PropertyValue::String(s) => s.clone(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

/// A vector feature: one or more geometries plus named attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometries: Vec<Geometry>,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Feature {
    pub fn new(geometries: Vec<Geometry>) -> Self {
        Self {
            geometries,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// The feature's join-field value. A missing attribute joins as the
    /// empty string, which shares a grid code unit with "no feature here".
    pub fn join_value(&self, join_field: &str) -> String {
        self.properties
            .get(join_field)
            .map(|v| v.to_join_string())
            .unwrap_or_default()
    }
}
