use serde::Deserialize;
use std::time::Duration;

/// Immutable policy for a single crawl run
///
/// Built once at startup (from defaults, an optional TOML file and CLI
/// overrides) and shared read-only by every worker.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RunPolicy {
    /// Seed URL; its host defines the crawl domain
    pub seed_url: String,

    /// Maximum number of concurrent in-flight fetches
    pub max_concurrency: usize,

    /// Maximum number of distinct pages to register
    pub max_pages: usize,

    /// Number of discovered links scheduled per scheduling pass
    pub batch_size: usize,

    /// Links beyond this count on a single page are dropped
    pub max_links_per_page: usize,

    /// Upper bound for one page fetch, including retries (milliseconds)
    pub request_timeout_ms: u64,

    /// Upper bound for the whole run (seconds)
    pub run_timeout_secs: u64,

    /// How long in-flight work may unwind after cancellation (milliseconds)
    pub shutdown_grace_ms: u64,

    /// Number of retries after the first attempt
    pub retry_ceiling: u32,

    /// Backoff delay before the first retry (milliseconds)
    pub backoff_base_ms: u64,

    /// Backoff delay cap (milliseconds)
    pub backoff_cap_ms: u64,

    /// Failures after which a host is no longer contacted
    pub circuit_breaker_threshold: u64,

    /// Largest accepted response body (bytes)
    pub max_body_bytes: usize,

    /// Politeness delay before the first attempt on a page (milliseconds)
    pub request_delay_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_concurrency: 10,
            max_pages: 10,
            batch_size: 5,
            max_links_per_page: 1000,
            request_timeout_ms: 30_000,
            run_timeout_secs: 600,
            shutdown_grace_ms: 2_000,
            retry_ceiling: 3,
            backoff_base_ms: 500,
            backoff_cap_ms: 30_000,
            circuit_breaker_threshold: 10,
            max_body_bytes: 10 * 1024 * 1024,
            request_delay_ms: 100,
            user_agent: "Mozilla/5.0 (compatible; Sitewalk/1.0)".to_string(),
        }
    }
}

impl RunPolicy {
    /// Creates a policy with default limits for the given seed
    pub fn for_seed(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}
