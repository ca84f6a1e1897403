//! Loader types
//!
//! Declarative connector definition types for YAML parsing.

use crate::engine::StreamDescriptor;
use crate::types::Params;
use serde::{Deserialize, Serialize};

// ============================================================================
// Connector Definition
// ============================================================================

/// Top-level connector definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConnectorDefinition {
    /// Connector name
    pub name: String,
    /// Connector version
    #[serde(default = "default_version")]
    pub version: String,
    /// Default base URL for all requests
    pub base_url: String,
    /// Connection check configuration
    pub check: CheckDefinition,
    /// Stream table
    pub streams: Vec<StreamDescriptor>,
}

/// Connection check configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckDefinition {
    /// URL path for check endpoint
    pub path: String,
    /// Query parameters
    #[serde(default)]
    pub params: Params,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ConnectorDefinition {
    /// Find a stream by name
    pub fn stream(&self, name: &str) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Stream names in table order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name.as_str()).collect()
    }
}
