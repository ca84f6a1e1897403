//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `StreamDescriptor` - Static per-stream metadata, loaded from YAML
//! - `ResourceStream` - Paginator, extractor and cursor behind one pull loop
//! - `SyncConfig` - Checkpoint interval and record limits
//! - Message types for output (Record, State, Log)

mod descriptor;
mod stream;
mod types;

pub use descriptor::{ConfigList, IncrementalDescriptor, PartitionDescriptor, StreamDescriptor};
pub use stream::ResourceStream;
pub use types::{Message, MessageStream, SyncConfig, SyncStats};
