//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like headers
//! - Rejecting non-HTML and oversized responses
//! - Classifying failures as retryable or terminal

use crate::config::RunPolicy;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Upper bound on connection setup
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of page bodies for the crawl engine
///
/// Implementations perform a single attempt; retrying is the caller's job.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML body at `url`, giving up after `timeout`
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, FetchError>;
}

/// Builds an HTTP client with the crawler's headers and connection limits
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::RunPolicy;
/// use sitewalk::crawler::build_http_client;
///
/// let policy = RunPolicy::for_seed("https://example.com/");
/// let client = build_http_client(&policy).unwrap();
/// ```
pub fn build_http_client(policy: &RunPolicy) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));

    Client::builder()
        .user_agent(policy.user_agent.as_str())
        .default_headers(headers)
        .timeout(policy.request_timeout())
        .connect_timeout(connect_timeout(policy))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Connection setup never gets longer than the whole request
fn connect_timeout(policy: &RunPolicy) -> Duration {
    CONNECT_TIMEOUT.min(policy.request_timeout())
}

/// [`PageFetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    pub fn from_policy(policy: &RunPolicy) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(policy)?, policy.max_body_bytes))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL with full error classification
    ///
    /// # Request Flow
    ///
    /// 1. Send GET (redirects are followed by the client)
    /// 2. Status >= 400 → `HttpStatus`
    /// 3. Content-Type present and not `text/html` → `ContentTypeRejected`
    /// 4. Content-Length above the cap → `BodyTooLarge`
    /// 5. Stream the body, stopping with `BodyTooLarge` once the cap is hit
    ///
    /// A missing Content-Type header is accepted.
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(FetchError::ContentTypeRejected {
                url: url.to_string(),
                content_type,
            });
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(self.too_large(url));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(url, e))? {
            body.extend_from_slice(&chunk);
            if body.len() >= self.max_body_bytes {
                return Err(self.too_large(url));
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl HttpFetcher {
    fn too_large(&self, url: &Url) -> FetchError {
        FetchError::BodyTooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        }
    }
}

/// Maps a `reqwest` failure onto the fetch error taxonomy
///
/// Only timeouts and connection-level failures come back as retryable.
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_redirect() {
        FetchError::Redirect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_decode() {
        FetchError::Decode {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_builder() {
        FetchError::MalformedRequest {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
