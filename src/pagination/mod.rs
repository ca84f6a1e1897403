//! Pagination module
//!
//! Supports: JSON:API `links.next`, single page
//!
//! # Overview
//!
//! A paginator has two jobs: derive the next `PageToken` from the page just
//! fetched, and turn a token (or its absence, for the first page) into the
//! query parameters of the next request. Both are pure functions of their
//! inputs, so one paginator can be shared by every page of a stream.

mod strategies;
mod types;

pub use strategies::{JsonApiPaginator, NoPaginator};
pub use types::{PageToken, Paginator, PAGE_NUMBER_PARAM, PAGE_SIZE_PARAM};
