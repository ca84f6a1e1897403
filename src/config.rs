//! Configuration types
//!
//! This module contains the inbound source configuration supplied by the
//! host, the configuration specification returned by `spec`, and the
//! catalog types exchanged during `discover` and `read`.

use crate::error::{Error, Result};
use crate::state::Watermark;
use crate::types::{DestinationSyncMode, JsonValue, SyncMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.teamtailor.com/v1/";

/// Default number of records between state checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

// ============================================================================
// Source Config
// ============================================================================

/// Runtime configuration for the source, as supplied by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API token, sent as `Authorization: Token token=<access_token>`
    pub access_token: String,

    /// Value of the `X-Api-Version` header
    pub api_version: String,

    /// ISO-8601 date or datetime seeding incremental cursors
    pub start_date: String,

    /// Custom field ids used to slice the custom field values stream
    #[serde(default)]
    pub custom_field_ids: Vec<String>,

    /// Override of the API base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Records between state checkpoints
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Maximum retries for a single page request
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Client-side request rate limit
    #[serde(default)]
    pub requests_per_second: Option<u32>,
}

fn default_checkpoint_interval() -> usize {
    DEFAULT_CHECKPOINT_INTERVAL
}

impl SourceConfig {
    /// Create a config with the required fields and defaults for the rest
    pub fn new(
        access_token: impl Into<String>,
        api_version: impl Into<String>,
        start_date: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            api_version: api_version.into(),
            start_date: start_date.into(),
            custom_field_ids: Vec::new(),
            base_url: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            max_retries: None,
            requests_per_second: None,
        }
    }

    /// Parse and validate a config from a raw JSON value
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        for field in ["access_token", "api_version", "start_date"] {
            if value.get(field).map_or(true, JsonValue::is_null) {
                return Err(Error::missing_field(field));
            }
        }

        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field contents beyond what serde enforces
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(Error::invalid_value("access_token", "must not be empty"));
        }
        if self.api_version.trim().is_empty() {
            return Err(Error::invalid_value("api_version", "must not be empty"));
        }
        if self.checkpoint_interval == 0 {
            return Err(Error::invalid_value(
                "checkpoint_interval",
                "must be greater than zero",
            ));
        }
        self.start_watermark()?;
        Ok(())
    }

    /// Parsed start date
    pub fn start_watermark(&self) -> Result<Watermark> {
        Watermark::parse(&self.start_date).ok_or_else(|| {
            Error::invalid_value(
                "start_date",
                format!("'{}' is not an ISO-8601 date or datetime", self.start_date),
            )
        })
    }

    /// Base URL with a guaranteed trailing slash
    pub fn base_url(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        format!("{}/", base.trim_end_matches('/'))
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the custom field ids
    #[must_use]
    pub fn with_custom_field_ids(mut self, ids: Vec<String>) -> Self {
        self.custom_field_ids = ids;
        self
    }

    /// Set the checkpoint interval
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Set max retries
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

// ============================================================================
// Spec Config (for UI)
// ============================================================================

/// Configuration specification for connector setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyConfig>,
}

/// Configuration property definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type ("string", "integer", "array", ...)
    #[serde(rename = "type")]
    pub property_type: String,

    /// Property description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Format hint (e.g., "date-time")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Example values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<JsonValue>,
}

impl PropertyConfig {
    fn new(property_type: &str, description: &str) -> Self {
        Self {
            property_type: property_type.to_string(),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }
}

impl SpecConfig {
    /// Specification of `SourceConfig`
    pub fn source() -> Self {
        let mut properties = BTreeMap::new();

        properties.insert(
            "access_token".to_string(),
            PropertyConfig {
                secret: true,
                required: true,
                ..PropertyConfig::new("string", "Teamtailor API token")
            },
        );
        properties.insert(
            "api_version".to_string(),
            PropertyConfig {
                required: true,
                examples: vec![JsonValue::from("20210218")],
                ..PropertyConfig::new("string", "Value of the X-Api-Version header")
            },
        );
        properties.insert(
            "start_date".to_string(),
            PropertyConfig {
                required: true,
                format: Some("date-time".to_string()),
                examples: vec![JsonValue::from("2022-05-01T00:00:00Z")],
                ..PropertyConfig::new("string", "Records updated before this are not replicated")
            },
        );
        properties.insert(
            "custom_field_ids".to_string(),
            PropertyConfig::new("array", "Custom field ids to replicate values for"),
        );
        properties.insert(
            "checkpoint_interval".to_string(),
            PropertyConfig::new("integer", "Records between state checkpoints"),
        );

        Self { properties }
    }

    /// Names of required properties, sorted
    pub fn required(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render as a JSON schema object for the `SPEC` message
    pub fn to_json_schema(&self, title: &str) -> JsonValue {
        let properties: serde_json::Map<String, JsonValue> = self
            .properties
            .iter()
            .map(|(name, p)| {
                let mut property = serde_json::json!({ "type": p.property_type });
                if let Some(description) = &p.description {
                    property["description"] = JsonValue::from(description.clone());
                }
                if let Some(format) = &p.format {
                    property["format"] = JsonValue::from(format.clone());
                }
                if p.secret {
                    property["airbyte_secret"] = JsonValue::Bool(true);
                }
                if !p.examples.is_empty() {
                    property["examples"] = JsonValue::Array(p.examples.clone());
                }
                if p.property_type == "array" {
                    property["items"] = serde_json::json!({ "type": "string" });
                }
                (name.clone(), property)
            })
            .collect();

        serde_json::json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": title,
            "type": "object",
            "required": self.required(),
            "properties": properties,
            "additionalProperties": true
        })
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Configure every stream in its most capable sync mode
    pub fn to_configured(&self) -> ConfiguredCatalog {
        let streams = self
            .streams
            .iter()
            .map(|stream| {
                let sync_mode = if stream.supported_sync_modes.contains(&SyncMode::Incremental) {
                    SyncMode::Incremental
                } else {
                    SyncMode::FullRefresh
                };
                ConfiguredStream {
                    stream: stream.clone(),
                    sync_mode,
                    destination_sync_mode: DestinationSyncMode::Append,
                    cursor_field: stream.default_cursor_field.clone(),
                    primary_key: stream.source_defined_primary_key.clone(),
                }
            })
            .collect();

        ConfiguredCatalog { streams }
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: JsonValue,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Whether the source picks the cursor
    #[serde(default)]
    pub source_defined_cursor: bool,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    /// Look up a configured stream by name
    pub fn get(&self, name: &str) -> Option<&ConfiguredStream> {
        self.streams.iter().find(|s| s.stream.name == name)
    }

    /// Keep only the named streams
    #[must_use]
    pub fn select(mut self, names: &[&str]) -> Self {
        self.streams
            .retain(|s| names.contains(&s.stream.name.as_str()));
        self
    }
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Destination sync mode
    #[serde(default)]
    pub destination_sync_mode: DestinationSyncMode,

    /// Cursor field to use
    #[serde(default)]
    pub cursor_field: Option<Vec<String>>,

    /// Primary key to use
    #[serde(default)]
    pub primary_key: Option<Vec<Vec<String>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_source_config() {
        let config = SourceConfig::from_value(&json!({
            "access_token": "secret",
            "api_version": "20210218",
            "start_date": "2022-05-01",
            "custom_field_ids": ["11", "12"]
        }))
        .unwrap();

        assert_eq!(config.access_token, "secret");
        assert_eq!(config.api_version, "20210218");
        assert_eq!(config.custom_field_ids, vec!["11", "12"]);
        assert_eq!(config.checkpoint_interval, DEFAULT_CHECKPOINT_INTERVAL);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_spec_json_schema() {
        let spec = SpecConfig::source();
        assert_eq!(spec.required(), vec!["access_token", "api_version", "start_date"]);

        let schema = spec.to_json_schema("Teamtailor Spec");
        assert_eq!(schema["title"], "Teamtailor Spec");
        assert_eq!(schema["properties"]["access_token"]["airbyte_secret"], true);
        assert_eq!(schema["properties"]["custom_field_ids"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["start_date"]["format"], "date-time");
    }

    #[test]
    fn test_missing_required_field() {
        let err = SourceConfig::from_value(&json!({
            "access_token": "secret",
            "start_date": "2022-05-01"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { field } if field == "api_version"));
    }

    #[test]
    fn test_invalid_start_date() {
        let err = SourceConfig::from_value(&json!({
            "access_token": "secret",
            "api_version": "20210218",
            "start_date": "last tuesday"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { field, .. } if field == "start_date"));
    }

    #[test]
    fn test_zero_checkpoint_interval_rejected() {
        let config = SourceConfig::new("t", "v", "2022-05-01").with_checkpoint_interval(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = SourceConfig::new("t", "v", "2022-05-01").with_base_url("http://localhost:1234");
        assert_eq!(config.base_url(), "http://localhost:1234/");

        let config = config.with_base_url("http://localhost:1234/v1//");
        assert_eq!(config.base_url(), "http://localhost:1234/v1/");
    }

    #[test]
    fn test_spec_marks_token_secret() {
        let spec = SpecConfig::source();
        let token = &spec.properties["access_token"];
        assert!(token.secret);
        assert!(token.required);
        assert!(!spec.properties["custom_field_ids"].required);
    }

    #[test]
    fn test_catalog_to_configured() {
        let catalog = Catalog {
            streams: vec![
                CatalogStream {
                    name: "candidates".to_string(),
                    json_schema: json!({}),
                    supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
                    source_defined_cursor: true,
                    default_cursor_field: Some(vec!["updated-at".to_string()]),
                    source_defined_primary_key: Some(vec![vec!["id".to_string()]]),
                },
                CatalogStream {
                    name: "jobs".to_string(),
                    json_schema: json!({}),
                    supported_sync_modes: vec![SyncMode::FullRefresh],
                    source_defined_cursor: false,
                    default_cursor_field: None,
                    source_defined_primary_key: Some(vec![vec!["id".to_string()]]),
                },
            ],
        };

        let configured = catalog.to_configured();
        assert_eq!(
            configured.get("candidates").unwrap().sync_mode,
            SyncMode::Incremental
        );
        assert_eq!(configured.get("jobs").unwrap().sync_mode, SyncMode::FullRefresh);

        let selected = configured.select(&["jobs"]);
        assert_eq!(selected.streams.len(), 1);
        assert!(selected.get("candidates").is_none());
    }
}
