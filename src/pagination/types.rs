//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::error::Result;
use crate::types::{JsonValue, Params};

/// Query parameter carrying the page number
pub const PAGE_NUMBER_PARAM: &str = "page[number]";

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "page[size]";

/// Opaque continuation marker: the raw "next" link of the previous page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    next: String,
}

impl PageToken {
    /// Wrap a next-page link
    pub fn new(next: impl Into<String>) -> Self {
        Self { next: next.into() }
    }

    /// The raw link
    pub fn as_str(&self) -> &str {
        &self.next
    }

    /// Value of a query parameter embedded in the link
    ///
    /// Works for absolute and relative links; keys are percent-decoded, so
    /// `page%5Bnumber%5D` matches `page[number]`.
    pub fn query_value(&self, key: &str) -> Option<String> {
        let query = self.next.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or_default();
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// The `page[number]` component of the link
    pub fn page_number(&self) -> Option<String> {
        self.query_value(PAGE_NUMBER_PARAM).filter(|v| !v.is_empty())
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.next)
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Query parameters for the request after `token`, or for the first page when `None`
    fn request_params(&self, token: Option<&PageToken>) -> Result<Params>;

    /// Token for the page after `body`, or `None` when `body` is the last page
    fn next_page_token(&self, body: &JsonValue) -> Option<PageToken>;
}
