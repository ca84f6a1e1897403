//! Partition router implementations

use super::types::{PartitionRouter, PartitionValue};
use crate::error::Result;

// ============================================================================
// List Router
// ============================================================================

/// Static list-based partition router
///
/// Creates one partition per configured value. Duplicates and blank values
/// are dropped, first occurrence wins.
#[derive(Debug, Clone)]
pub struct ListRouter {
    /// List of partition values
    values: Vec<String>,
    /// Request parameter for partition
    partition_param: String,
}

impl ListRouter {
    /// Create a new list router
    pub fn new(values: Vec<String>, partition_param: impl Into<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.trim().to_string();
            if !value.is_empty() && !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self {
            values: unique,
            partition_param: partition_param.into(),
        }
    }

    /// Whether there is nothing to partition over
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartitionRouter for ListRouter {
    fn partitions(&self) -> Result<Vec<PartitionValue>> {
        Ok(self
            .values
            .iter()
            .map(|v| PartitionValue::new(v.clone()).with_param(self.partition_param.clone(), v.clone()))
            .collect())
    }

    fn partition_param(&self) -> &str {
        &self.partition_param
    }
}
