//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cursor field name mapped to the ISO-8601 text of its high-water mark
pub type CursorState = BTreeMap<String, String>;

/// Complete state for a connector
///
/// ```json
/// {"streams": {"candidates": {"cursor": {"updated-at": "2024-01-02T00:00:00Z"}}}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a state document, treating `null` as empty
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::new());
        }
        serde_json::from_value(value.clone()).map_err(|e| Error::state(format!("Invalid state: {e}")))
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Replace the state of one stream
    pub fn set_stream(&mut self, stream: &str, state: StreamState) {
        self.streams.insert(stream.to_string(), state);
    }

    /// Get the cursor state of a stream
    pub fn get_cursor(&self, stream: &str) -> Option<&CursorState> {
        self.streams.get(stream).map(|s| &s.cursor)
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    /// Stream-level cursor (unpartitioned incremental streams)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cursor: CursorState,

    /// Per-partition cursors, keyed by partition id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub partitions: BTreeMap<String, CursorState>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream state holding just a cursor
    pub fn with_cursor(cursor: CursorState) -> Self {
        Self {
            cursor,
            partitions: BTreeMap::new(),
        }
    }

    /// Cursor state of a partition
    pub fn get_partition(&self, partition_id: &str) -> Option<&CursorState> {
        self.partitions.get(partition_id)
    }

    /// Record the cursor state of a partition
    pub fn set_partition(&mut self, partition_id: &str, cursor: CursorState) {
        self.partitions.insert(partition_id.to_string(), cursor);
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty() && self.partitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cursor(value: &str) -> CursorState {
        CursorState::from([("updated-at".to_string(), value.to_string())])
    }

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.streams.is_empty());
        assert!(state.get_cursor("candidates").is_none());
    }

    #[test]
    fn test_state_set_stream() {
        let mut state = State::new();
        state.set_stream("candidates", StreamState::with_cursor(cursor("2024-01-01")));

        assert_eq!(
            state.get_cursor("candidates").unwrap().get("updated-at"),
            Some(&"2024-01-01".to_string())
        );
    }

    #[test]
    fn test_stream_state_partitions() {
        let mut stream_state = StreamState::new();
        assert!(stream_state.is_empty());

        stream_state.set_partition("42", cursor("2024-02-01"));
        assert!(!stream_state.is_empty());
        assert_eq!(stream_state.get_partition("42"), Some(&cursor("2024-02-01")));
        assert!(stream_state.get_partition("43").is_none());
    }

    #[test]
    fn test_state_document_shape() {
        let mut state = State::new();
        state
            .get_stream_mut("candidates")
            .cursor
            .insert("updated-at".to_string(), "2024-01-02T00:00:00Z".to_string());
        state.set_stream("jobs", StreamState::new());

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "streams": {
                    "candidates": {"cursor": {"updated-at": "2024-01-02T00:00:00Z"}},
                    "jobs": {}
                }
            })
        );
    }

    #[test]
    fn test_state_from_value() {
        let state = State::from_value(&json!({
            "streams": {"job-applications": {"cursor": {"updated-at": "2023-05-01"}}}
        }))
        .unwrap();
        assert_eq!(
            state.get_cursor("job-applications"),
            Some(&cursor("2023-05-01"))
        );

        assert_eq!(State::from_value(&JsonValue::Null).unwrap(), State::new());
        assert!(State::from_value(&json!({"streams": 3})).is_err());
    }
}
