//! Shared aliases and small enums

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type JsonValue = serde_json::Value;
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One flattened resource instance as emitted downstream
pub type Record = JsonObject;

/// Query parameters, ordered so two requests for the same page are identical
pub type Params = BTreeMap<String, String>;

/// How a configured stream is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Everything since `start_date`; persisted state is neither read nor written
    #[default]
    FullRefresh,
    /// Resume from the stored `updated-at` watermark
    Incremental,
}

/// Catalog hint for the host; the connector itself ignores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationSyncMode {
    #[default]
    Append,
    Overwrite,
    AppendDedup,
}

/// Severity of a protocol `LOG` message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Growth of the delay between two attempts of the same request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    Constant,
    Linear,
    #[default]
    Exponential,
}

/// What an incremental stream does with a record that lacks a usable cursor value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCursorPolicy {
    /// Leave the watermark untouched and keep going
    #[default]
    Skip,
    /// Abort the stream with `Error::MissingCursorField`
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_mode_serde() {
        let mode: SyncMode = serde_json::from_str("\"incremental\"").unwrap();
        assert_eq!(mode, SyncMode::Incremental);

        let json = serde_json::to_string(&SyncMode::FullRefresh).unwrap();
        assert_eq!(json, "\"full_refresh\"");
    }

    #[test]
    fn test_missing_cursor_policy_serde() {
        assert_eq!(MissingCursorPolicy::default(), MissingCursorPolicy::Skip);
        let policy: MissingCursorPolicy = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(policy, MissingCursorPolicy::Fail);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(
            serde_json::to_string(&LogLevel::Error).unwrap(),
            "\"ERROR\""
        );
    }
}
