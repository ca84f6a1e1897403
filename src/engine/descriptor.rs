//! Stream descriptors
//!
//! Everything that differs between two resources of the same API lives in a
//! `StreamDescriptor`: the path, the relations to flatten, page size, sort,
//! static filters, and whether the stream is incremental or partitioned.

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::extract::JsonApiExtractor;
use crate::pagination::JsonApiPaginator;
use crate::partition::ListRouter;
use crate::state::{Cursor, Watermark};
use crate::types::{MissingCursorPolicy, Params};
use serde::{Deserialize, Serialize};

/// Static per-stream metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Stream name, unique within a connector
    pub name: String,
    /// Resource path relative to the API base
    pub path: String,
    /// Primary key fields
    #[serde(default = "default_primary_key")]
    pub primary_key: Vec<String>,
    /// Relations to include and flatten, in order
    #[serde(default)]
    pub relations: Vec<String>,
    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Sort order sent as `sort`
    #[serde(default)]
    pub sort: Option<String>,
    /// Static query filters
    #[serde(default)]
    pub filters: Params,
    /// Incremental sync settings; absent for full-refresh streams
    #[serde(default)]
    pub incremental: Option<IncrementalDescriptor>,
    /// Partitioning over a config list
    #[serde(default)]
    pub partition: Option<PartitionDescriptor>,
}

/// Incremental sync settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalDescriptor {
    /// Record field holding the update timestamp
    #[serde(default = "default_cursor_field")]
    pub cursor_field: String,
    /// Query parameter receiving the "updated since" value
    #[serde(default = "default_cursor_filter")]
    pub cursor_filter: String,
    /// What to do with records lacking the cursor field
    #[serde(default)]
    pub missing_cursor: MissingCursorPolicy,
}

/// Partitioning settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    /// Config list providing the partition values
    pub values_from: ConfigList,
    /// Query parameter receiving each value
    pub param: String,
}

/// Config lists a stream can be partitioned over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigList {
    /// `custom_field_ids`
    CustomFieldIds,
}

impl ConfigList {
    /// The list's values in `config`
    pub fn values(self, config: &SourceConfig) -> Vec<String> {
        match self {
            Self::CustomFieldIds => config.custom_field_ids.clone(),
        }
    }
}

fn default_primary_key() -> Vec<String> {
    vec!["id".to_string()]
}

fn default_page_size() -> u32 {
    10
}

fn default_cursor_field() -> String {
    "updated-at".to_string()
}

fn default_cursor_filter() -> String {
    "filter[updated-at][from]".to_string()
}

impl StreamDescriptor {
    /// Minimal full-refresh descriptor
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_key: default_primary_key(),
            relations: Vec::new(),
            page_size: default_page_size(),
            sort: None,
            filters: Params::new(),
            incremental: None,
            partition: None,
        }
    }

    /// Set the relations to flatten
    #[must_use]
    pub fn with_relations<S: Into<String>>(mut self, relations: impl IntoIterator<Item = S>) -> Self {
        self.relations = relations.into_iter().map(Into::into).collect();
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the sort order
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Add a static filter
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Make the stream incremental on `updated-at`
    #[must_use]
    pub fn incremental(mut self, missing_cursor: MissingCursorPolicy) -> Self {
        self.incremental = Some(IncrementalDescriptor {
            cursor_field: default_cursor_field(),
            cursor_filter: default_cursor_filter(),
            missing_cursor,
        });
        self
    }

    /// Partition the stream over a config list
    #[must_use]
    pub fn partitioned(mut self, values_from: ConfigList, param: impl Into<String>) -> Self {
        self.partition = Some(PartitionDescriptor {
            values_from,
            param: param.into(),
        });
        self
    }

    /// Whether the stream supports incremental sync
    pub fn is_incremental(&self) -> bool {
        self.incremental.is_some()
    }

    /// Cursor field, for incremental streams
    pub fn cursor_field(&self) -> Option<&str> {
        self.incremental.as_ref().map(|i| i.cursor_field.as_str())
    }

    /// Check the descriptor is usable
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("Stream name cannot be empty"));
        }
        if self.path.trim_matches('/').is_empty() {
            return Err(Error::config(format!(
                "Stream '{}' path cannot be empty",
                self.name
            )));
        }
        if self.page_size == 0 {
            return Err(Error::config(format!(
                "Stream '{}' page_size must be positive",
                self.name
            )));
        }
        if self.primary_key.is_empty() {
            return Err(Error::config(format!(
                "Stream '{}' needs a primary key",
                self.name
            )));
        }
        if let Some(incremental) = &self.incremental {
            if incremental.cursor_field.is_empty() || incremental.cursor_filter.is_empty() {
                return Err(Error::config(format!(
                    "Stream '{}' incremental settings need a cursor field and filter",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Paginator sending page size, includes, sort and static filters on every page
    pub fn paginator(&self) -> JsonApiPaginator {
        let mut paginator = JsonApiPaginator::new(self.page_size).with_include(&self.relations);
        if let Some(sort) = &self.sort {
            paginator = paginator.with_param("sort", sort.clone());
        }
        for (key, value) in &self.filters {
            paginator = paginator.with_param(key.clone(), value.clone());
        }
        paginator
    }

    /// Extractor flattening this stream's relations
    pub fn extractor(&self) -> JsonApiExtractor {
        JsonApiExtractor::new(self.relations.iter().cloned())
    }

    /// Fresh cursor seeded with `start`, for incremental streams
    pub fn cursor(&self, start: &Watermark) -> Option<Cursor> {
        self.incremental.as_ref().map(|i| {
            Cursor::new(i.cursor_field.clone(), start.clone(), i.missing_cursor).for_stream(&self.name)
        })
    }

    /// Router over the configured list; `None` when unpartitioned or the list is empty
    pub fn router(&self, config: &SourceConfig) -> Option<ListRouter> {
        let partition = self.partition.as_ref()?;
        let router = ListRouter::new(partition.values_from.values(config), partition.param.clone());
        (!router.is_empty()).then_some(router)
    }
}
