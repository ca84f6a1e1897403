//! Crate error type
//!
//! Transport failures and error statuses carry enough to decide whether a
//! request is worth repeating; everything else aborts the current operation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    /// The request never produced a status line
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status, with the response body as sent by the API
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Pagination error: {message}")]
    Pagination { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Record in stream '{stream}' has no usable cursor field '{field}'")]
    MissingCursorField { stream: String, field: String },

    #[error("State error: {message}")]
    State { message: String },

    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound { stream: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn missing_cursor(stream: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingCursorField {
            stream: stream.into(),
            field: field.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Whether repeating the same request may succeed
    ///
    /// Throttling (429), server errors, timeouts and dropped connections are
    /// transient. Any other status or failure is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::missing_field("access_token").to_string(),
            "Missing required config field: access_token"
        );
        assert_eq!(
            Error::http_status(429, r#"{"error":{"message":"Slow down"}}"#).to_string(),
            r#"HTTP 429: {"error":{"message":"Slow down"}}"#
        );
        assert_eq!(
            Error::missing_cursor("candidates", "updated-at").to_string(),
            "Record in stream 'candidates' has no usable cursor field 'updated-at'"
        );
    }

    #[test_case(429, true ; "throttled")]
    #[test_case(500, true ; "server error")]
    #[test_case(503, true ; "unavailable")]
    #[test_case(400, false ; "bad request")]
    #[test_case(401, false ; "bad token")]
    #[test_case(404, false ; "unknown resource")]
    fn test_status_is_retryable(status: u16, retryable: bool) {
        let err = Error::http_status(status, "");
        assert_eq!(err.is_retryable(), retryable);
        assert_eq!(err.status(), Some(status));
    }

    #[test]
    fn test_other_errors_are_final() {
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(!Error::config("bad").is_retryable());
        assert!(!Error::missing_cursor("jobs", "updated-at").is_retryable());
        assert!(!Error::decode("not json").is_retryable());
        assert_eq!(Error::decode("not json").status(), None);
    }
}
