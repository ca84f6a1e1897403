//! Schema inference from records

use super::types::{merge_maps, JsonSchema, JsonType, SchemaProperty};
use crate::types::{JsonValue, Record};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DATETIME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").ok());
static DATE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());
static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Accumulates records and produces a stream schema
///
/// A field is required when it is present and non-null in every record
/// observed. Primary key fields passed to `finish` are always required.
#[derive(Debug, Clone)]
pub struct SchemaInferrer {
    /// Maximum depth for nested objects
    max_depth: usize,
    records: usize,
    /// Records in which each field was present and non-null
    present: BTreeMap<String, usize>,
    properties: BTreeMap<String, SchemaProperty>,
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferrer {
    /// Create a new schema inferrer with default settings
    pub fn new() -> Self {
        Self {
            max_depth: 10,
            records: 0,
            present: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Fold one record into the schema
    pub fn observe(&mut self, record: &Record) {
        let observed: BTreeMap<String, SchemaProperty> = record
            .iter()
            .map(|(key, value)| (key.clone(), self.infer_property(value, 0)))
            .collect();

        for (key, value) in record {
            if !value.is_null() {
                *self.present.entry(key.clone()).or_default() += 1;
            }
        }

        self.properties = if self.records == 0 {
            observed
        } else {
            merge_maps(&self.properties, &observed)
        };
        self.records += 1;
    }

    /// The inferred schema
    pub fn finish(self, primary_key: &[String]) -> JsonSchema {
        let mut schema = JsonSchema::new();

        for key in primary_key {
            schema.add_required(key);
        }
        for (key, count) in &self.present {
            if *count == self.records {
                schema.add_required(key);
            }
        }

        schema.properties = self.properties;
        schema
    }

    /// Schema of a batch of records
    pub fn infer_records(records: &[Record], primary_key: &[String]) -> JsonSchema {
        let mut inferrer = Self::new();
        for record in records {
            inferrer.observe(record);
        }
        inferrer.finish(primary_key)
    }

    fn infer_property(&self, value: &JsonValue, depth: usize) -> SchemaProperty {
        if depth >= self.max_depth {
            return SchemaProperty::new(JsonType::Object);
        }

        match value {
            JsonValue::Null => SchemaProperty::new(JsonType::Null),
            JsonValue::Bool(_) => SchemaProperty::new(JsonType::Boolean),
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => SchemaProperty::new(JsonType::Integer),
            JsonValue::Number(_) => SchemaProperty::new(JsonType::Number),
            JsonValue::String(s) => match string_format(s) {
                Some(format) => SchemaProperty::new(JsonType::String).with_format(format),
                None => SchemaProperty::new(JsonType::String),
            },
            JsonValue::Array(items) => {
                let item = items
                    .iter()
                    .map(|item| self.infer_property(item, depth + 1))
                    .reduce(|a, b| a.merge(&b))
                    .unwrap_or_else(|| SchemaProperty::new(JsonType::Object));
                SchemaProperty::array(item)
            }
            JsonValue::Object(map) => SchemaProperty::object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.infer_property(v, depth + 1)))
                    .collect(),
            ),
        }
    }
}

fn string_format(s: &str) -> Option<&'static str> {
    if is_match(&DATETIME, s) {
        Some("date-time")
    } else if is_match(&DATE, s) {
        Some("date")
    } else if s.starts_with("http://") || s.starts_with("https://") {
        Some("uri")
    } else if is_match(&EMAIL, s) {
        Some("email")
    } else {
        None
    }
}

fn is_match(re: &Option<Regex>, s: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(s))
}
