//! Schema inference module
//!
//! Builds a JSON schema for a stream from sampled records, used by
//! `discover` when sampling is requested.
//!
//! # Features
//!
//! - **Type Inference**: string, integer, number, boolean, object, array
//! - **Nullable Detection**: fields that are null or absent in some records
//! - **Format Hints**: `date-time`, `date`, `uri` and `email` strings

mod inference;
mod types;

pub use inference::SchemaInferrer;
pub use types::{JsonSchema, JsonType, SchemaProperty, TypeSet};

#[cfg(test)]
mod tests;
