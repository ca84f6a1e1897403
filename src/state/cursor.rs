//! Incremental cursor
//!
//! A `Cursor` remembers the largest timestamp seen in one record field. It
//! starts at the configured start date, can be replaced from persisted state,
//! and only ever moves forward.

use super::types::CursorState;
use crate::error::{Error, Result};
use crate::types::{JsonObject, MissingCursorPolicy};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

/// A timestamp together with the text it was parsed from
///
/// Comparisons go through the instant; the text is what gets persisted, so a
/// state value read back and written again is unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    at: DateTime<Utc>,
    raw: String,
}

impl Watermark {
    /// Parse an RFC 3339 datetime, a zone-less datetime (taken as UTC) or a
    /// bare `YYYY-MM-DD` date (midnight UTC)
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let at = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            })?;

        Some(Self {
            at,
            raw: trimmed.to_string(),
        })
    }

    /// The parsed instant
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// The original text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when `self` is strictly later than `other`
    pub fn is_after(&self, other: &Watermark) -> bool {
        self.at > other.at
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// High-water mark over one timestamp field
#[derive(Debug, Clone)]
pub struct Cursor {
    stream: String,
    field: String,
    start: Watermark,
    current: Watermark,
    policy: MissingCursorPolicy,
}

impl Cursor {
    /// Create a cursor over `field`, seeded with `start`
    pub fn new(field: impl Into<String>, start: Watermark, policy: MissingCursorPolicy) -> Self {
        Self {
            stream: String::new(),
            field: field.into(),
            current: start.clone(),
            start,
            policy,
        }
    }

    /// Name the owning stream in errors and logs
    #[must_use]
    pub fn for_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    /// The record field being tracked
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The policy for records without a usable value
    pub fn policy(&self) -> MissingCursorPolicy {
        self.policy
    }

    /// The current high-water mark
    pub fn current(&self) -> &Watermark {
        &self.current
    }

    /// Persistable form: `{field: text of the current mark}`
    pub fn state(&self) -> CursorState {
        CursorState::from([(self.field.clone(), self.current.raw.clone())])
    }

    /// Replace the mark from persisted state
    ///
    /// A missing, empty or unparseable value resets to the start date.
    pub fn set_state(&mut self, state: &CursorState) {
        self.current = match state.get(&self.field).map(|v| v.trim()) {
            None | Some("") => self.start.clone(),
            Some(value) => match Watermark::parse(value) {
                Some(mark) => mark,
                None => {
                    warn!(
                        stream = %self.stream,
                        field = %self.field,
                        value,
                        "Unparseable cursor in state, falling back to start date"
                    );
                    self.start.clone()
                }
            },
        };
    }

    /// Fold one record into the mark
    pub fn observe(&mut self, record: &JsonObject) -> Result<()> {
        let parsed = record
            .get(&self.field)
            .and_then(|v| v.as_str())
            .and_then(Watermark::parse);

        match parsed {
            Some(mark) => {
                if mark.is_after(&self.current) {
                    self.current = mark;
                }
                Ok(())
            }
            None => match self.policy {
                MissingCursorPolicy::Skip => {
                    debug!(
                        stream = %self.stream,
                        field = %self.field,
                        id = ?record.get("id"),
                        "Record has no usable cursor value"
                    );
                    Ok(())
                }
                MissingCursorPolicy::Fail => Err(Error::missing_cursor(&self.stream, &self.field)),
            },
        }
    }

    /// Value for the server-side "updated since" filter
    pub fn filter_value(&self) -> &str {
        self.current.as_str()
    }
}
