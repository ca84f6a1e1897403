//! YAML Loader module
//!
//! Parse connector definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `ConnectorDefinition` - Base URL, connection check and stream table
//! - YAML parsing with validation, from a built-in name or a file path

mod parser;
mod types;

pub use parser::{load_connector, load_connector_from_str};
pub use types::{CheckDefinition, ConnectorDefinition};

#[cfg(test)]
mod tests;
