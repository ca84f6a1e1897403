//! JSON:API extractor

use super::types::RecordExtractor;
use crate::types::{JsonValue, Record};
use tracing::warn;

/// Flattens JSON:API resource objects into records
///
/// Given relations `["candidate", "reject-reason"]`, the element
///
/// ```json
/// {"id": "7", "attributes": {"sourced": true},
///  "relationships": {"candidate": {"data": {"type": "candidates", "id": "3"}},
///                    "reject-reason": {"data": null}}}
/// ```
///
/// becomes `{"id": "7", "candidate_id": "3", "sourced": true}`.
#[derive(Debug, Clone, Default)]
pub struct JsonApiExtractor {
    relations: Vec<String>,
}

impl JsonApiExtractor {
    /// Extractor flattening `relations`, in order
    pub fn new<S: Into<String>>(relations: impl IntoIterator<Item = S>) -> Self {
        Self {
            relations: relations.into_iter().map(Into::into).collect(),
        }
    }

    /// The relations being flattened
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    fn flatten(&self, element: &JsonValue) -> Option<Record> {
        let JsonValue::Object(resource) = element else {
            warn!(element = %element, "Skipping non-object element in data");
            return None;
        };

        let mut record = Record::new();
        if let Some(id) = resource.get("id") {
            record.insert("id".to_string(), id.clone());
        }

        let relationships = resource.get("relationships");
        for relation in &self.relations {
            let id = relationships
                .and_then(|r| r.get(relation))
                .and_then(|r| r.get("data"))
                .and_then(|data| data.get("id"))
                .filter(|id| !is_blank(id));
            if let Some(id) = id {
                record.insert(relation_key(relation), id.clone());
            }
        }

        if let Some(JsonValue::Object(attributes)) = resource.get("attributes") {
            for (key, value) in attributes {
                record.insert(key.clone(), value.clone());
            }
        }

        Some(record)
    }
}

impl RecordExtractor for JsonApiExtractor {
    fn records<'a>(&'a self, body: &'a JsonValue) -> Box<dyn Iterator<Item = Record> + 'a> {
        match body.get("data") {
            Some(JsonValue::Array(elements)) => {
                Box::new(elements.iter().filter_map(|element| self.flatten(element)))
            }
            // A single-resource document
            Some(element @ JsonValue::Object(_)) => Box::new(self.flatten(element).into_iter()),
            _ => Box::new(std::iter::empty()),
        }
    }
}

/// Foreign-key field name for a relation: `reject-reason` becomes `reject_reason_id`
pub fn relation_key(relation: &str) -> String {
    format!("{}_id", relation.replace('-', "_"))
}

fn is_blank(id: &JsonValue) -> bool {
    match id {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        _ => false,
    }
}
