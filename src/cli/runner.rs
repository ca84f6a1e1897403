//! CLI runner - executes commands
//!
//! Every command writes protocol JSON lines to stdout. Diagnostics go
//! to stderr through `tracing`.

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ConfiguredCatalog, SourceConfig};
use crate::connector::{Connector, SourceConnector};
use crate::connectors::list_builtin;
use crate::engine::Message;
use crate::error::{Error, Result};
use crate::loader::load_connector;
use crate::state::StateManager;
use crate::types::LogLevel;
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover { sample } => self.discover(*sample).await,
            Commands::Read { catalog, .. } => self.read(catalog.as_deref()).await,
            Commands::Streams => self.streams(),
            Commands::Validate => self.validate(),
            Commands::List => self.list_connectors(),
        }
    }

    /// Load the connector named by `--connector`, or the built-in one
    fn load_connector(&self) -> Result<SourceConnector> {
        match &self.cli.connector {
            Some(path) => load_connector(path).map(SourceConnector::from_definition),
            None => SourceConnector::new(),
        }
    }

    /// Load configuration, inline JSON first, then the config file
    fn load_config(&self) -> Result<SourceConfig> {
        let raw: Value = if let Some(json_str) = &self.cli.config_json {
            serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?
        } else if let Some(path) = &self.cli.config {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?
        } else {
            return Err(Error::config(
                "No configuration given (use --config or --config-json)",
            ));
        };

        SourceConfig::from_value(&raw)
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Load the configured catalog from a file, or configure every stream
    async fn load_catalog(
        &self,
        connector: &SourceConnector,
        config: &SourceConfig,
        path: Option<&std::path::Path>,
    ) -> Result<ConfiguredCatalog> {
        let catalog = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .map_err(|e| Error::config(format!("Failed to read catalog file: {e}")))?;
                serde_json::from_str(&content)
                    .map_err(|e| Error::config(format!("Invalid catalog JSON: {e}")))?
            }
            None => connector.discover(config, 0).await?.to_configured(),
        };

        Ok(match self.cli.command.stream_filter() {
            Some(names) => catalog.select(&names),
            None => catalog,
        })
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let connector = self.load_connector()?;
        let spec = connector.spec();

        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "documentationUrl": "https://docs.airbyte.com/integrations/sources/teamtailor",
                "connectionSpecification": spec.spec.to_json_schema(&format!("{} Spec", spec.title))
            }
        }));

        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let connector = self.load_connector()?;
        let config = self.load_config()?;

        self.output_message(&log_json(
            LogLevel::Info,
            &format!("Checking connection to {}", connector.definition().name),
        ));

        let result = connector.check_connection(&config).await;
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": if result.success { "SUCCEEDED" } else { "FAILED" },
                "message": result.message
            }
        }));

        Ok(())
    }

    /// Discover streams
    async fn discover(&self, sample: usize) -> Result<()> {
        let connector = self.load_connector()?;
        let config = self.load_config()?;
        let catalog = connector.discover(&config, sample).await?;

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }));

        Ok(())
    }

    /// Read data
    async fn read(&self, catalog_path: Option<&std::path::Path>) -> Result<()> {
        let sync_start = Instant::now();
        let connector = self.load_connector()?;
        let config = self.load_config()?;
        let state = self.load_state()?;
        let catalog = self.load_catalog(&connector, &config, catalog_path).await?;

        let prior = state.snapshot().await;
        let mut messages = connector.read(&config, &catalog, Some(&prior)).await?;

        let mut records: BTreeMap<String, usize> = catalog
            .streams
            .iter()
            .map(|s| (s.stream.name.clone(), 0))
            .collect();
        let mut errors = Vec::new();
        let mut checkpoints = 0usize;

        while let Some(message) = messages.next().await {
            let message = message?;
            match &message {
                Message::Record { stream, .. } => {
                    *records.entry(stream.clone()).or_default() += 1;
                }
                Message::State { stream, data } => {
                    state.set_stream(stream, data.clone()).await?;
                    checkpoints += 1;
                }
                Message::Log {
                    level: LogLevel::Error,
                    message,
                } => errors.push(message.clone()),
                Message::Log { .. } => {}
            }
            self.output_message(&message_json(&message));
        }

        state.save().await?;

        let total_records: usize = records.values().sum();
        let duration_ms = u64::try_from(sync_start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            records = total_records,
            streams = records.len(),
            failed = errors.len(),
            duration_ms,
            "Sync finished"
        );

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": sync_status(records.len(), errors.len()),
                "connector": connector.definition().name,
                "total_records": total_records,
                "total_streams": records.len(),
                "failed_streams": errors.len(),
                "checkpoints": checkpoints,
                "duration_ms": duration_ms,
                "state_file": self.cli.state.as_ref().map(|p| p.to_string_lossy().to_string()),
                "records": records,
                "errors": errors
            }
        }));

        Ok(())
    }

    /// List available streams (lightweight, no schemas)
    fn streams(&self) -> Result<()> {
        let connector = self.load_connector()?;
        let definition = connector.definition();

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": definition.stream_names(),
            "connector": definition.name
        }));

        Ok(())
    }

    /// Validate connector definition
    fn validate(&self) -> Result<()> {
        let connector = self.load_connector()?;
        let definition = connector.definition();

        self.output_message(&log_json(
            LogLevel::Info,
            &format!(
                "Connector '{}' v{} is valid with {} streams",
                definition.name,
                definition.version,
                definition.streams.len()
            ),
        ));

        Ok(())
    }

    /// List built-in connectors
    fn list_connectors(&self) -> Result<()> {
        let mut connectors = Vec::new();
        for name in list_builtin() {
            let definition = load_connector(name)?;
            connectors.push(json!({
                "name": definition.name,
                "version": definition.version,
                "base_url": definition.base_url,
                "streams": definition.stream_names()
            }));
        }

        self.output_message(&json!({
            "type": "CONNECTORS",
            "connectors": connectors
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Protocol form of an engine message
fn message_json(msg: &Message) -> Value {
    match msg {
        Message::Record {
            stream,
            data,
            emitted_at,
        } => json!({
            "type": "RECORD",
            "record": {
                "stream": stream,
                "data": data,
                "emitted_at": emitted_at
            }
        }),
        Message::State { stream, data } => json!({
            "type": "STATE",
            "state": {
                "type": "STREAM",
                "stream": {
                    "stream_descriptor": {
                        "name": stream
                    },
                    "stream_state": data
                }
            }
        }),
        Message::Log { level, message } => log_json(*level, message),
    }
}

fn log_json(level: LogLevel, message: &str) -> Value {
    json!({
        "type": "LOG",
        "log": {
            "level": level,
            "message": message
        }
    })
}

fn sync_status(streams: usize, failed: usize) -> &'static str {
    if failed == 0 {
        "SUCCEEDED"
    } else if failed >= streams {
        "FAILED"
    } else {
        "PARTIAL"
    }
}
