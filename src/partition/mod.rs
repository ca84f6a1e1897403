//! Partition routing module
//!
//! Supports: static list of values
//!
//! # Overview
//!
//! Partitions split one stream into sequential sub-queries, each with its own
//! pagination. A list router turns a configured list (for example a set of
//! custom field ids) into one partition per value, each adding a filter
//! parameter to every request of that partition.

mod routers;
mod types;

pub use routers::ListRouter;
pub use types::{PartitionRouter, PartitionValue};

#[cfg(test)]
mod tests;
