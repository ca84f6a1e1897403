//! Pagination strategy implementations

use super::types::{PageToken, Paginator, PAGE_NUMBER_PARAM, PAGE_SIZE_PARAM};
use crate::error::{Error, Result};
use crate::types::{JsonValue, Params};

// ============================================================================
// JSON:API Pagination
// ============================================================================

/// JSON:API page-number pagination driven by `links.next`
///
/// The first request carries the base parameters (`page[size]`, `include`
/// and whatever static filters or sort the stream adds). Every later request
/// carries the same base plus the `page[number]` parsed out of the previous
/// page's `links.next`.
#[derive(Debug, Clone)]
pub struct JsonApiPaginator {
    base: Params,
}

impl JsonApiPaginator {
    /// Create a paginator requesting `page_size` records per page
    pub fn new(page_size: u32) -> Self {
        let mut base = Params::new();
        base.insert(PAGE_SIZE_PARAM.to_string(), page_size.to_string());
        Self { base }
    }

    /// Ask the API to embed these relations (`include=a,b`)
    #[must_use]
    pub fn with_include<S: AsRef<str>>(mut self, relations: &[S]) -> Self {
        if !relations.is_empty() {
            let joined = relations
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(",");
            self.base.insert("include".to_string(), joined);
        }
        self
    }

    /// Add a parameter sent with every page
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base.insert(key.into(), value.into());
        self
    }

    /// Parameters sent with every page
    pub fn base_params(&self) -> &Params {
        &self.base
    }
}

impl Paginator for JsonApiPaginator {
    fn request_params(&self, token: Option<&PageToken>) -> Result<Params> {
        let mut params = self.base.clone();
        if let Some(token) = token {
            let page = token.page_number().ok_or_else(|| {
                Error::pagination(format!("next link '{token}' has no {PAGE_NUMBER_PARAM}"))
            })?;
            params.insert(PAGE_NUMBER_PARAM.to_string(), page);
        }
        Ok(params)
    }

    fn next_page_token(&self, body: &JsonValue) -> Option<PageToken> {
        match body.get("links")?.get("next")? {
            JsonValue::String(next) if !next.is_empty() => Some(PageToken::new(next.clone())),
            _ => None,
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator {
    params: Params,
}

impl NoPaginator {
    /// Single request carrying `params`
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }
}

impl Paginator for NoPaginator {
    fn request_params(&self, _token: Option<&PageToken>) -> Result<Params> {
        Ok(self.params.clone())
    }

    fn next_page_token(&self, _body: &JsonValue) -> Option<PageToken> {
        None
    }
}
