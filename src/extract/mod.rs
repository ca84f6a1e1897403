//! Record extraction module
//!
//! Supports: JSON:API documents
//!
//! # Overview
//!
//! An extractor turns one page body into flat records. For JSON:API that
//! means lifting `attributes` to the top level and replacing each configured
//! to-one relationship with a `<relation>_id` foreign key.

mod jsonapi;
mod types;

pub use jsonapi::{relation_key, JsonApiExtractor};
pub use types::RecordExtractor;

#[cfg(test)]
mod tests;
