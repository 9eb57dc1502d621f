//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`PageFetcher`] seam
//! - HTML parsing and link extraction
//! - Retry with bounded exponential backoff
//! - The per-URL crawl engine and the run controller around it

mod controller;
mod engine;
mod fetcher;
mod parser;
mod retry;
mod work;

pub use controller::{run_crawl, shutdown_signal, CrawlReport, RunController, RunOutcome};
pub use engine::{CrawlEngine, VisitOutcome};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use parser::{
    extract_image_urls, extract_links, parse_page, PageData, MAX_HTML_BYTES, MAX_LINKS_PER_PAGE,
};
pub use retry::{backoff_delay, RetryError, RetryExecutor, Retryable, MAX_BACKOFF_EXPONENT};
pub use work::{WorkGuard, WorkTracker};
