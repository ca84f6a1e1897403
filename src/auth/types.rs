//! Auth configuration types

use crate::config::SourceConfig;

/// Authentication configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Rails-style token auth: `Authorization: Token token=<token>`
    Token {
        /// The API token
        token: String,
    },
}

impl AuthConfig {
    /// Token auth from the source config
    pub fn from_source(config: &SourceConfig) -> Self {
        Self::Token {
            token: config.access_token.clone(),
        }
    }

    /// Whether any credential is attached
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
