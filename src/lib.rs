//! Sitewalk: a bounded single-domain site crawler
//!
//! This crate walks every page reachable from a seed URL inside the seed's
//! domain, counts how often each page is linked, and records traffic to
//! external domains. The walk is bounded by page count, concurrency,
//! per-request time and total run time, and tolerates failing hosts.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Run-level error type for Sitewalk operations
///
/// Per-page failures never surface here; they are counted and logged by the
/// crawl engine. Only problems that prevent a run from starting do.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL {url}: {source}")]
    SeedUrl { url: String, source: UrlError },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors (the MalformedURL family)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors produced by a single page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build request for {url}: {message}")]
    MalformedRequest { url: String, message: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Redirect error for {url}: {message}")]
    Redirect { url: String, message: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Content-type is not HTML (got: {content_type}) for {url}")]
    ContentTypeRejected { url: String, content_type: String },

    #[error("Response body too large (>= {limit} bytes) for {url}")]
    BodyTooLarge { url: String, limit: usize },

    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Whether a retry has a chance of succeeding
    ///
    /// Network failures and timeouts are transient, as are the gateway and
    /// throttling statuses 429, 502, 503, 504 and the 520-524 range used by
    /// CDNs. Everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network { .. } | FetchError::Timeout { .. } => true,
            FetchError::HttpStatus { status, .. } => is_retryable_status(*status),
            FetchError::MalformedRequest { .. }
            | FetchError::Redirect { .. }
            | FetchError::Decode { .. }
            | FetchError::ContentTypeRejected { .. }
            | FetchError::BodyTooLarge { .. }
            | FetchError::Cancelled { .. } => false,
        }
    }
}

/// HTTP statuses worth retrying
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504 | 520..=524)
}

/// Errors produced while extracting data from a fetched page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("HTML body too large ({size} bytes, max {limit})")]
    BodyTooLarge { size: usize, limit: usize },

    #[error("Invalid base URL {0}")]
    InvalidBase(String),
}

// Re-export commonly used types
pub use crate::config::RunPolicy;
pub use crate::crawler::{run_crawl, CrawlReport, RunOutcome};
pub use crate::url::normalize_url;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::HttpStatus {
            url: "https://example.com/".to_string(),
            status: code,
        }
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429, 502, 503, 504, 520, 521, 522, 523, 524] {
            assert!(status(code).is_retryable(), "{} should be retryable", code);
        }
    }

    #[test]
    fn test_terminal_statuses() {
        for code in [400, 401, 403, 404, 410, 500, 501, 519, 525] {
            assert!(!status(code).is_retryable(), "{} should be terminal", code);
        }
    }

    #[test]
    fn test_network_errors_are_retryable() {
        let err = FetchError::Network {
            url: "https://example.com/".to_string(),
            message: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
        assert!(FetchError::Timeout {
            url: "https://example.com/".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_redirect_and_decode_errors_are_terminal() {
        let err = FetchError::Redirect {
            url: "https://example.com/loop".to_string(),
            message: "too many redirects".to_string(),
        };
        assert!(!err.is_retryable());

        let err = FetchError::Decode {
            url: "https://example.com/".to_string(),
            message: "corrupt deflate stream".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_content_errors_are_terminal() {
        let err = FetchError::ContentTypeRejected {
            url: "https://example.com/a.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        };
        assert!(!err.is_retryable());

        let err = FetchError::BodyTooLarge {
            url: "https://example.com/big".to_string(),
            limit: 10,
        };
        assert!(!err.is_retryable());
    }
}
