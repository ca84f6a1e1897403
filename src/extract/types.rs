//! Extractor traits

use crate::types::{JsonValue, Record};

/// Trait for turning a page body into records
pub trait RecordExtractor: Send + Sync {
    /// Records of the page, in document order
    fn extract(&self, body: &JsonValue) -> Vec<Record> {
        self.records(body).collect()
    }

    /// Lazy iteration over the records of the page
    fn records<'a>(&'a self, body: &'a JsonValue) -> Box<dyn Iterator<Item = Record> + 'a>;
}
