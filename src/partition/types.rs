//! Partition types and traits
//!
//! Defines the core partition abstractions.

use crate::error::Result;
use crate::types::Params;

/// A single partition value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionValue {
    /// Unique identifier for this partition, also its key in stream state
    pub id: String,
    /// Query parameters added to every request of the partition
    pub params: Params,
}

impl PartitionValue {
    /// Create a new partition value
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: Params::new(),
        }
    }

    /// Add a query parameter to the partition
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Get a parameter by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Trait for partition routers
pub trait PartitionRouter: Send + Sync {
    /// Generate partition values; empty means the stream is read unpartitioned
    fn partitions(&self) -> Result<Vec<PartitionValue>>;

    /// The request parameter each partition sets
    fn partition_param(&self) -> &str;
}
