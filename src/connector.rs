//! Connector trait and the Teamtailor source
//!
//! `SourceConnector` turns the embedded stream table into `ResourceStream`s
//! and drives the four protocol operations: spec, check, discover and read.

use crate::auth::Authenticator;
use crate::config::{Catalog, CatalogStream, ConfiguredCatalog, SourceConfig, SpecConfig};
use crate::connectors::TEAMTAILOR;
use crate::engine::{Message, MessageStream, ResourceStream, StreamDescriptor};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::loader::{load_connector, ConnectorDefinition};
use crate::pagination::{NoPaginator, Paginator};
use crate::schema::{JsonSchema, SchemaInferrer};
use crate::state::State;
use crate::types::{JsonValue, SyncMode};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================================
// Connector Spec (for UI)
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Connector version
    pub version: String,

    /// Description
    pub description: Option<String>,

    /// Configuration specification
    pub spec: SpecConfig,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Protocol operations every source implements
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector specification (for UI/validation)
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    ///
    /// Failures are reported in the result, never as `Err`.
    async fn check_connection(&self, config: &SourceConfig) -> CheckResult;

    /// Lists available streams, inferring schemas from up to `sample` records each
    async fn discover(&self, config: &SourceConfig, sample: usize) -> Result<Catalog>;

    /// Reads the selected streams one after another
    ///
    /// Returns a stream of messages (records, state checkpoints, logs)
    async fn read(
        &self,
        config: &SourceConfig,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream>;
}

// ============================================================================
// Source Connector
// ============================================================================

/// The Teamtailor source, driven by a connector definition
#[derive(Debug, Clone)]
pub struct SourceConnector {
    definition: ConnectorDefinition,
}

impl SourceConnector {
    /// Source backed by the built-in stream table
    pub fn new() -> Result<Self> {
        load_connector(TEAMTAILOR).map(Self::from_definition)
    }

    /// Source backed by a custom definition
    pub fn from_definition(definition: ConnectorDefinition) -> Self {
        Self { definition }
    }

    /// The loaded definition
    pub fn definition(&self) -> &ConnectorDefinition {
        &self.definition
    }

    /// Config with the definition's base URL filled in when none is given
    fn effective_config(&self, config: &SourceConfig) -> SourceConfig {
        let mut config = config.clone();
        if config.base_url.is_none() {
            config.base_url = Some(self.definition.base_url.clone());
        }
        config
    }

    /// Build every stream in the table
    ///
    /// All streams share one HTTP client, so they share authentication,
    /// headers and the rate limiter.
    pub fn streams(&self, config: &SourceConfig) -> Result<Vec<ResourceStream>> {
        config.validate()?;
        let config = self.effective_config(config);
        let client = HttpClient::for_source(&config)?;

        self.definition
            .streams
            .iter()
            .cloned()
            .map(|descriptor| ResourceStream::new(descriptor, client.clone(), &config))
            .collect()
    }

    async fn catalog_stream(&self, stream: &ResourceStream, sample: usize) -> CatalogStream {
        let descriptor = stream.descriptor();
        let json_schema = if sample == 0 {
            JsonSchema::new().to_json()
        } else {
            match stream.sample(sample).await {
                Ok(records) => {
                    debug!(stream = %stream.name(), records = records.len(), "Inferred schema");
                    SchemaInferrer::infer_records(&records, &descriptor.primary_key).to_json()
                }
                Err(e) => {
                    warn!(stream = %stream.name(), error = %e, "Sampling failed, using open schema");
                    JsonSchema::new().to_json()
                }
            }
        };

        catalog_entry(descriptor, json_schema)
    }
}

/// Catalog entry for a descriptor with the given schema
fn catalog_entry(descriptor: &StreamDescriptor, json_schema: JsonValue) -> CatalogStream {
    let cursor_field = descriptor.cursor_field().map(|f| vec![f.to_string()]);
    CatalogStream {
        name: descriptor.name.clone(),
        json_schema,
        supported_sync_modes: if descriptor.is_incremental() {
            vec![SyncMode::FullRefresh, SyncMode::Incremental]
        } else {
            vec![SyncMode::FullRefresh]
        },
        source_defined_cursor: cursor_field.is_some(),
        default_cursor_field: cursor_field,
        source_defined_primary_key: if descriptor.primary_key.is_empty() {
            None
        } else {
            Some(descriptor.primary_key.iter().map(|k| vec![k.clone()]).collect())
        },
    }
}

#[async_trait]
impl Connector for SourceConnector {
    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec {
            name: format!("source-{}", self.definition.name),
            title: "Teamtailor".to_string(),
            version: self.definition.version.clone(),
            description: Some(
                "Replicates candidates, jobs, job applications and related resources".to_string(),
            ),
            spec: SpecConfig::source(),
        }
    }

    async fn check_connection(&self, config: &SourceConfig) -> CheckResult {
        if let Err(e) = config.validate() {
            return CheckResult::failure(e.to_string());
        }
        let config = self.effective_config(config);
        let client = match HttpClient::for_source(&config) {
            Ok(client) => client,
            Err(e) => return CheckResult::failure(e.to_string()),
        };

        let check = &self.definition.check;
        let params = match NoPaginator::with_params(check.params.clone()).request_params(None) {
            Ok(params) => params,
            Err(e) => return CheckResult::failure(e.to_string()),
        };
        let request = RequestConfig::new().params(params).retries(0);

        match client.get_with_config(&check.path, request).await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!(
                    path = %check.path,
                    auth = %client.authenticator().map(Authenticator::redacted).unwrap_or_default(),
                    "Connection check succeeded"
                );
                CheckResult::success()
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                CheckResult::failure(failure_message(status, &body))
            }
            Err(Error::HttpStatus { status, body }) => {
                info!(path = %check.path, status, "Connection check failed");
                CheckResult::failure(failure_message(status, &body))
            }
            Err(e) => CheckResult::failure(e.to_string()),
        }
    }

    async fn discover(&self, config: &SourceConfig, sample: usize) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        for stream in self.streams(config)? {
            catalog.streams.push(self.catalog_stream(&stream, sample).await);
        }
        Ok(catalog)
    }

    async fn read(
        &self,
        config: &SourceConfig,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream> {
        let mut available = self.streams(config)?;
        let mut selected = Vec::with_capacity(catalog.streams.len());

        for configured in &catalog.streams {
            let name = &configured.stream.name;
            let position = available
                .iter()
                .position(|s| s.name() == name)
                .ok_or_else(|| Error::StreamNotFound {
                    stream: name.clone(),
                })?;
            let mut stream = available.swap_remove(position);

            match configured.sync_mode {
                SyncMode::Incremental => {
                    if let Some(prior) = state.and_then(|s| s.get_stream(name)) {
                        stream.set_state(prior);
                    }
                }
                SyncMode::FullRefresh => stream.set_full_refresh(),
            }
            selected.push(stream);
        }

        info!(streams = selected.len(), "Starting read");

        let messages = futures::stream::iter(selected).flat_map(|stream| {
            let name = stream.name().to_string();
            stream.read().map(move |item| {
                Ok::<_, Error>(item.unwrap_or_else(|e| {
                    Message::error(format!("Stream '{name}' failed: {e}"))
                }))
            })
        });
        Ok(Box::pin(messages))
    }
}

// ============================================================================
// Check Helpers
// ============================================================================

/// Human-readable reason for a failed check
///
/// Prefers the API's own error text, then the raw body, then the status line.
fn failure_message(status: u16, body: &str) -> String {
    if let Some(message) = api_error_message(body) {
        return message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

fn api_error_message(body: &str) -> Option<String> {
    let json: JsonValue = serde_json::from_str(body).ok()?;
    ["/error/message", "/error/info", "/errors/0/detail", "/errors/0/title"]
        .into_iter()
        .filter_map(|pointer| json.pointer(pointer).and_then(JsonValue::as_str))
        .find(|s| !s.trim().is_empty())
        .map(ToString::to_string)
}
