//! Schema types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON Schema primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// The more general of two types
    ///
    /// Integers widen to numbers; any other conflict falls back to string.
    pub fn merge_with(self, other: JsonType) -> JsonType {
        match (self, other) {
            (a, b) if a == b => a,
            (JsonType::Null, t) | (t, JsonType::Null) => t,
            (JsonType::Integer, JsonType::Number) | (JsonType::Number, JsonType::Integer) => {
                JsonType::Number
            }
            _ => JsonType::String,
        }
    }
}

/// A single type, or a type plus `null`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl TypeSet {
    /// `[t, "null"]`, or just `"null"`
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            TypeSet::Single(JsonType::Null)
        } else {
            TypeSet::Multiple(vec![t, JsonType::Null])
        }
    }

    /// Whether `null` is allowed
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeSet::Single(t) => *t == JsonType::Null,
            TypeSet::Multiple(types) => types.contains(&JsonType::Null),
        }
    }

    /// The non-null type, if any
    pub fn primary(&self) -> Option<JsonType> {
        match self {
            TypeSet::Single(t) => Some(*t),
            TypeSet::Multiple(types) => types.iter().copied().find(|t| *t != JsonType::Null),
        }
    }

    /// Union of two sets
    pub fn merge_with(&self, other: &TypeSet) -> TypeSet {
        let merged = match (self.primary(), other.primary()) {
            (Some(a), Some(b)) => a.merge_with(b),
            (Some(t), None) | (None, Some(t)) => t,
            (None, None) => JsonType::Null,
        };
        if self.is_nullable() || other.is_nullable() {
            TypeSet::nullable(merged)
        } else {
            TypeSet::Single(merged)
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub json_type: TypeSet,

    /// Format hint (e.g., "date-time", "email", "uri")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Array items schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// Create a property with the given type
    pub fn new(json_type: JsonType) -> Self {
        Self {
            json_type: TypeSet::Single(json_type),
            format: None,
            properties: None,
            items: None,
        }
    }

    /// Create an object property with nested properties
    pub fn object(properties: BTreeMap<String, SchemaProperty>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::new(JsonType::Object)
        }
    }

    /// Create an array property with item schema
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(JsonType::Array)
        }
    }

    /// Set format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Allow `null`
    pub fn make_nullable(&mut self) {
        if !self.json_type.is_nullable() {
            self.json_type = self.json_type.merge_with(&TypeSet::Single(JsonType::Null));
        }
    }

    /// Check if nullable
    pub fn is_nullable(&self) -> bool {
        self.json_type.is_nullable()
    }

    /// Combine two observations of the same property
    pub fn merge(&self, other: &SchemaProperty) -> SchemaProperty {
        let format = match (&self.format, &other.format) {
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            (Some(_), Some(_)) => None,
            (Some(f), None) | (None, Some(f)) => {
                // A null observation keeps the hint; a string without it drops it
                let other_is_null = |p: &SchemaProperty| p.json_type == TypeSet::Single(JsonType::Null);
                (other_is_null(self) || other_is_null(other)).then(|| f.clone())
            }
            (None, None) => None,
        };

        let properties = match (&self.properties, &other.properties) {
            (Some(a), Some(b)) => Some(merge_maps(a, b)),
            (Some(p), None) | (None, Some(p)) => Some(p.clone()),
            (None, None) => None,
        };

        let items = match (&self.items, &other.items) {
            (Some(a), Some(b)) => Some(Box::new(a.merge(b))),
            (Some(i), None) | (None, Some(i)) => Some(i.clone()),
            (None, None) => None,
        };

        SchemaProperty {
            json_type: self.json_type.merge_with(&other.json_type),
            format,
            properties,
            items,
        }
    }
}

/// Merge two property maps; keys missing on either side become nullable
pub(crate) fn merge_maps(
    a: &BTreeMap<String, SchemaProperty>,
    b: &BTreeMap<String, SchemaProperty>,
) -> BTreeMap<String, SchemaProperty> {
    let mut merged = a.clone();
    for (key, b_prop) in b {
        match merged.get_mut(key) {
            Some(a_prop) => *a_prop = a_prop.merge(b_prop),
            None => {
                let mut prop = b_prop.clone();
                prop.make_nullable();
                merged.insert(key.clone(), prop);
            }
        }
    }
    for (key, prop) in &mut merged {
        if !b.contains_key(key) {
            prop.make_nullable();
        }
    }
    merged
}

/// Full JSON Schema document for a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema version
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Object properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Allow additional properties
    #[serde(rename = "additionalProperties", default = "default_true")]
    pub additional_properties: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    /// An object schema accepting anything
    pub fn new() -> Self {
        Self {
            schema: Some("http://json-schema.org/draft-07/schema#".to_string()),
            json_type: JsonType::Object,
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional_properties: true,
        }
    }

    /// Add a required property
    pub fn add_required(&mut self, name: &str) {
        if !self.is_required(name) {
            self.required.push(name.to_string());
        }
    }

    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}
