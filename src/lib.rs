// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # source-teamtailor
//!
//! Incremental pull connector for the Teamtailor recruiting API.
//!
//! Teamtailor speaks JSON:API. Each resource (candidates, jobs, job
//! applications, ...) is read page by page, flattened into one record per
//! resource with `<relation>_id` keys for to-one relationships, and, for
//! incremental resources, checkpointed by the `updated-at` watermark.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use source_teamtailor::{Connector, SourceConfig, SourceConnector};
//!
//! #[tokio::main]
//! async fn main() -> source_teamtailor::Result<()> {
//!     let connector = SourceConnector::new()?;
//!     let config = SourceConfig::new("token", "20210218", "2022-05-01");
//!
//!     let status = connector.check_connection(&config).await;
//!     let catalog = connector.discover(&config, 0).await?.to_configured();
//!
//!     let mut messages = connector.read(&config, &catalog, None).await?;
//!     while let Some(message) = messages.next().await {
//!         // Records, state checkpoints and logs
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SourceConnector                          │
//! │  spec()   check_connection()   discover()   read(catalog,state) │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                         ResourceStream
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Extract  │    State    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Token    │ Retry     │ links.next    │ JSON:API  │ Cursor      │
//! │ Headers  │ Rate Limit│ page[number]  │ flatten   │ Checkpoints │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Source configuration, spec and catalog types
pub mod config;

/// Request authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// JSON:API record extraction
pub mod extract;

/// Partition routing
pub mod partition;

/// State management and checkpointing
pub mod state;

/// Stream descriptors and the pull loop
pub mod engine;

/// YAML loader for connector definitions
pub mod loader;

/// Built-in connector definitions
pub mod connectors;

/// Connector trait and the Teamtailor source
pub mod connector;

/// Schema inference from JSON data
pub mod schema;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{Catalog, ConfiguredCatalog, SourceConfig};
pub use connector::{CheckResult, Connector, SourceConnector};
pub use engine::{Message, MessageStream, ResourceStream, StreamDescriptor};
pub use loader::{load_connector, load_connector_from_str, ConnectorDefinition};
pub use state::{State, StreamState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
