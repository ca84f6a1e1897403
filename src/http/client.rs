//! Shared HTTP client for every stream of a source
//!
//! One `HttpClient` is built per source config and cloned into each stream,
//! so all streams draw from the same rate limiter. Each call goes through
//! [`HttpClient::request`], which sends one attempt at a time and repeats
//! only what [`Error::is_retryable`] calls transient.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::{BackoffType, JsonValue, Params};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Client-wide settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for relative request paths
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Repeats after the first attempt; zero sends each request once
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Upper bound for both computed backoff and `Retry-After`
    pub max_backoff: Duration,
    pub backoff_type: BackoffType,
    pub rate_limit: Option<RateLimiterConfig>,
    /// Sent on every request, before per-request headers
    pub default_headers: HashMap<String, String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: HashMap::new(),
            user_agent: format!("source-teamtailor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Base URL, `X-Api-Version`, retry budget and request rate of a source
    pub fn from_source(source: &SourceConfig) -> Self {
        let mut builder = Self::builder()
            .base_url(source.base_url())
            .header("X-Api-Version", source.api_version.clone());
        if let Some(retries) = source.max_retries {
            builder = builder.max_retries(retries);
        }
        if let Some(rps) = source.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }
        builder.build()
    }
}

#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Backoff schedule used when the API gives no `Retry-After`
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request additions and overrides
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: Params,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    /// Replaces the client's retry budget for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Merge a whole parameter map into the query
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.query.extend(params);
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// A failed attempt and how long the API asked us to wait before the next
struct Failed {
    error: Error,
    retry_after: Option<Duration>,
}

impl From<Error> for Failed {
    fn from(error: Error) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        })
    }

    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_authenticator(auth_config);
        Ok(client)
    }

    /// Authenticated client for a source config
    pub fn for_source(source: &SourceConfig) -> Result<Self> {
        Self::with_auth(
            HttpClientConfig::from_source(source),
            AuthConfig::from_source(source),
        )
    }

    pub fn set_authenticator(&mut self, auth_config: AuthConfig) {
        self.authenticator = Some(Authenticator::new(auth_config));
    }

    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.authenticator.as_ref()
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestConfig::default()).await
    }

    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, url, config).await
    }

    /// GET and parse the body as JSON
    ///
    /// A success response whose body is not JSON is `Error::Decode`.
    pub async fn get_json_with_config(&self, url: &str, config: RequestConfig) -> Result<JsonValue> {
        let response = self.get_with_config(url, config).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::decode(format!("Failed to read response body: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("Response body is not JSON: {e}")))
    }

    /// Send a request, repeating it while the failure is transient
    ///
    /// Returns the first success response, the first final error, or the
    /// last transient error once the retry budget is spent. Error statuses
    /// keep the response body, so callers can surface the API's own message.
    pub async fn request(&self, method: Method, url: &str, config: RequestConfig) -> Result<Response> {
        let url = self.build_url(url);
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);

        let mut attempt = 0;
        loop {
            let failed = match self.send_once(&method, &url, &config).await {
                Ok(response) => {
                    debug!(%method, %url, status = response.status().as_u16(), "Request succeeded");
                    return Ok(response);
                }
                Err(failed) => failed,
            };

            if attempt >= max_retries || !failed.error.is_retryable() {
                return Err(failed.error);
            }

            let delay = failed.retry_after.unwrap_or_else(|| self.calculate_backoff(attempt));
            warn!(
                %url,
                attempt = attempt + 1,
                of = max_retries + 1,
                status = failed.error.status(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failed.error,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One attempt, with error statuses turned into `Error::HttpStatus`
    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
    ) -> std::result::Result<Response, Failed> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let timeout = config.timeout.unwrap_or(self.config.timeout);
        let headers = self.config.default_headers.iter().chain(&config.headers);
        let mut req = headers.fold(
            self.client.request(method.clone(), url).timeout(timeout),
            |req, (key, value)| req.header(key.as_str(), value.as_str()),
        );
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(auth) = &self.authenticator {
            req = auth.apply(req);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if status.is_success() || status.is_redirection() || status.is_informational() {
            return Ok(response);
        }

        let retry_after = self.retry_after(&response);
        let body = response.text().await.unwrap_or_default();
        Err(Failed {
            error: Error::http_status(status.as_u16(), body),
            retry_after,
        })
    }

    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Absolute URLs pass through; anything else is joined to the base URL
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    /// Delay before repeat number `attempt + 1`, capped at `max_backoff`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let initial = self.config.initial_backoff;
        let delay = match self.config.backoff_type {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.config.max_backoff)
    }

    /// `Retry-After` in whole seconds, capped at `max_backoff`
    fn retry_after(&self, response: &Response) -> Option<Duration> {
        let secs = response
            .headers()
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;
        Some(Duration::from_secs(secs).min(self.config.max_backoff))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
