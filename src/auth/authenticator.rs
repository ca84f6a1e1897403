//! Authenticator implementation
//!
//! Applies authentication headers to outgoing requests.

use super::types::AuthConfig;
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The underlying config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Header name/value pairs this authenticator adds
    pub fn headers(&self) -> Vec<(String, String)> {
        match &self.config {
            AuthConfig::None => Vec::new(),
            AuthConfig::Token { token } => vec![(
                "Authorization".to_string(),
                format!("Token token={token}"),
            )],
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        self.headers()
            .into_iter()
            .fold(req, |req, (key, value)| req.header(key, value))
    }

    /// Authorization header with the secret masked, for logging
    pub fn redacted(&self) -> String {
        match &self.config {
            AuthConfig::None => "none".to_string(),
            AuthConfig::Token { .. } => "Token token=****".to_string(),
        }
    }
}
