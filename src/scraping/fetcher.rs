//! Fetch engine for the outer crawl loop
//!
//! Plain HTTP fetching via reqwest. The engine reports what the server sent
//! (status, content type, body, post-redirect URL) and leaves every judgement
//! about whether the page is usable to the decision core. No retries.

use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Errors that can occur during fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),
}

/// What the server returned for one request
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL that was requested
    pub requested_url: Url,
    /// The URL the response came from (may differ due to redirects)
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header, empty when absent
    pub content_type: String,
    /// Raw response body
    pub body: Vec<u8>,
    /// Time taken to fetch
    pub fetch_duration: Duration,
}

impl FetchResult {
    /// Build a result for a response served directly from `url`
    pub fn new(
        url: Url,
        status_code: u16,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            requested_url: url.clone(),
            final_url: url,
            status_code,
            content_type: content_type.into(),
            body: body.into(),
            fetch_duration: Duration::ZERO,
        }
    }

    /// Set the post-redirect URL
    pub fn with_final_url(mut self, final_url: Url) -> Self {
        self.final_url = final_url;
        self
    }

    /// Check if this is HTML content
    pub fn is_html(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        content_type.contains("text/html") || content_type.contains("application/xhtml")
    }

    /// Check for a 200 response
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// Configuration for the fetch engine
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Concurrent connections per host
    pub connections_per_host: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_content_size: 10 * 1024 * 1024, // 10 MB
            max_redirects: 10,
            connections_per_host: 4,
        }
    }
}

impl FetchConfig {
    /// Derive fetch settings from the crawl section of the config file
    pub fn from_config(config: &crate::config::CrawlConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_content_size: config.max_content_size,
            connections_per_host: config.max_concurrent_fetches,
            ..Self::default()
        }
    }
}

/// HTTP fetch engine
pub struct FetchEngine {
    http_client: reqwest::Client,
    config: FetchConfig,
}

impl FetchEngine {
    /// Create a new fetch engine
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.connections_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { http_client, config })
    }

    /// Fetch a URL. Non-200 statuses are returned as results, not errors.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let start = Instant::now();

        let response = self.http_client.get(url.as_str()).send().await?;

        let status = response.status();
        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_content_size {
                return Err(FetchError::ContentTooLarge(len as usize));
            }
        }

        let body = response.bytes().await?;
        if body.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge(body.len()));
        }

        tracing::trace!(
            "Fetched {} ({} bytes, status {}) in {:?}",
            final_url,
            body.len(),
            status,
            start.elapsed()
        );

        Ok(FetchResult {
            requested_url: url.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
            fetch_duration: start.elapsed(),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}
