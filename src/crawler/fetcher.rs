//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client (user agent, language, proxy, timeouts)
//! - GET requests returning the page body
//! - Error classification into timeouts, HTTP statuses and transport errors
//! - Bounded retry for transient failures

use crate::config::{CrawlerConfig, HttpConfig};
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// Returns true for failures worth another attempt
    ///
    /// | Condition | Retried |
    /// |-----------|---------|
    /// | Timeout | yes |
    /// | Transport error | yes |
    /// | HTTP 429, 5xx | yes |
    /// | Other HTTP status | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// A user agent is picked at random from the configured list once per
/// client. With `use_proxy` off, proxy environment variables are ignored.
/// With it on, `proxy_url` is used when set and the environment otherwise.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agents
        .choose(&mut rand::rng())
        .cloned()
        .unwrap_or_default();

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&config.accept_language) {
        Ok(value) => {
            headers.insert(ACCEPT_LANGUAGE, value);
        }
        Err(e) => tracing::warn!(
            "Sending no Accept-Language header, {:?} is invalid: {}",
            config.accept_language,
            e
        ),
    }

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout.min(10)))
        .gzip(true)
        .brotli(true);

    builder = match (config.use_proxy, &config.proxy_url) {
        (false, _) => builder.no_proxy(),
        (true, Some(proxy_url)) => builder.proxy(Proxy::all(proxy_url.as_str())?),
        (true, None) => builder,
    };

    builder.build()
}

/// Fetches page bodies for the traversals
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the HTTP and retry settings
    pub fn new(http: &HttpConfig, crawler: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(http)?,
            crawler.max_retries,
            Duration::from_millis(crawler.retry_delay),
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Fetches a URL and returns its body text
    ///
    /// Transient failures are retried up to `max_retries` times; the last
    /// error is returned once attempts run out.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{} in {:?}",
                        url,
                        e,
                        attempt,
                        self.max_retries,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("Getting {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
