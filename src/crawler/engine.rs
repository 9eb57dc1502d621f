//! Crawl engine - per-URL visit logic and recursive scheduling
//!
//! Every discovered URL becomes its own task. A task:
//! - waits for one of `max_concurrency` admission slots
//! - classifies the URL (malformed, tripped host, external, in-domain)
//! - registers in-domain pages so each is fetched at most once
//! - fetches through the retry executor and extracts links
//! - schedules the links it found, in batches
//!
//! Cancellation is checked at the top of every task, while waiting for a
//! slot, during politeness and backoff waits, during the fetch, and before
//! each new task is scheduled.

use crate::config::RunPolicy;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::parse_page;
use crate::crawler::retry::{RetryError, RetryExecutor};
use crate::crawler::work::{WorkGuard, WorkTracker};
use crate::state::{
    CrawlStatistics, ExternalLinkRegistry, HostCircuitBreaker, PageRegistry, Registration,
};
use crate::url::{extract_host, is_same_site, normalize_parsed};
use crate::{CrawlError, FetchError, UrlError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What happened to a single visited URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The run was cancelled before or during the visit
    Cancelled,
    /// The URL could not be parsed or normalized
    Malformed,
    /// The host's circuit breaker is open
    HostTripped,
    /// The URL leaves the site and was only counted
    External,
    /// The page ceiling was reached before this page was registered
    CeilingReached,
    /// The page was already registered; its count is now the given value
    Duplicate(u64),
    /// The fetch failed terminally or exhausted its retries
    FetchFailed,
    /// The page was fetched; these links were found on it
    Fetched(Vec<String>),
}

/// Shared state and logic of a running crawl
pub struct CrawlEngine {
    policy: Arc<RunPolicy>,
    seed: Url,
    seed_host: String,
    pages: PageRegistry,
    external_links: ExternalLinkRegistry,
    breaker: HostCircuitBreaker,
    stats: CrawlStatistics,
    admission: Semaphore,
    work: WorkTracker,
    cancel: CancellationToken,
    retry: RetryExecutor,
    fetcher: Arc<dyn PageFetcher>,
    deadline: Instant,
}

impl CrawlEngine {
    /// Creates an engine for one run
    ///
    /// Failing to parse the seed URL is the only fatal condition of a run.
    pub fn new(
        policy: RunPolicy,
        fetcher: Arc<dyn PageFetcher>,
        cancel: CancellationToken,
    ) -> Result<Arc<Self>, CrawlError> {
        let seed = Url::parse(&policy.seed_url).map_err(|e| CrawlError::SeedUrl {
            url: policy.seed_url.clone(),
            source: UrlError::Parse(e.to_string()),
        })?;

        let seed_host = extract_host(&seed).ok_or_else(|| CrawlError::SeedUrl {
            url: policy.seed_url.clone(),
            source: UrlError::MissingDomain,
        })?;

        let retry = RetryExecutor::from_policy(&policy, cancel.clone());
        let deadline = run_deadline(Instant::now(), policy.run_timeout());

        Ok(Arc::new(Self {
            pages: PageRegistry::new(policy.max_pages),
            external_links: ExternalLinkRegistry::new(),
            breaker: HostCircuitBreaker::new(policy.circuit_breaker_threshold),
            stats: CrawlStatistics::new(),
            admission: Semaphore::new(policy.max_concurrency),
            work: WorkTracker::new(),
            policy: Arc::new(policy),
            seed,
            seed_host,
            cancel,
            retry,
            fetcher,
            deadline,
        }))
    }

    /// Schedules a visit of `raw_url` as a new task
    ///
    /// The task is registered with the work tracker before the cancellation
    /// check, so the tracker never misses a task. Returns false if the run
    /// is cancelled and nothing was spawned.
    pub fn schedule(self: &Arc<Self>, raw_url: String) -> bool {
        let guard = self.work.register();

        if self.cancel.is_cancelled() {
            return false;
        }

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.visit(raw_url, guard).await;
        });

        true
    }

    /// Visits one URL and schedules everything it links to
    ///
    /// The admission slot is released before `_guard` is dropped, so the
    /// work counter only reaches zero once every slot is free again.
    async fn visit(self: Arc<Self>, raw_url: String, _guard: WorkGuard) {
        if self.cancel.is_cancelled() {
            tracing::trace!("Run cancelled, skipping {}", raw_url);
            return;
        }

        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::trace!("Run cancelled while {} waited for a slot", raw_url);
                return;
            }
            permit = self.admission.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        let links = match self.process(&raw_url).await {
            VisitOutcome::Fetched(links) => links,
            outcome => {
                tracing::trace!("Visit of {} ended with {:?}", raw_url, outcome);
                return;
            }
        };

        for batch in links.chunks(self.policy.batch_size.max(1)) {
            for link in batch {
                if !self.schedule(link.clone()) {
                    tracing::debug!(
                        "Run cancelled, dropping remaining links from {}",
                        raw_url
                    );
                    return;
                }
            }
            tokio::task::yield_now().await;
        }
    }

    /// Classifies, registers, fetches and parses one URL
    ///
    /// Returns the links to schedule when the page was fetched. Does not
    /// touch the work tracker or the admission semaphore.
    pub async fn process(&self, raw_url: &str) -> VisitOutcome {
        let url = match Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                self.stats.record_failure();
                tracing::debug!("Error parsing URL {}: {}", raw_url, e);
                return VisitOutcome::Malformed;
            }
        };

        let Some(host) = extract_host(&url) else {
            self.stats.record_failure();
            tracing::debug!("URL {} has no host", raw_url);
            return VisitOutcome::Malformed;
        };

        if self.breaker.is_tripped(&host) {
            self.stats.record_failure();
            tracing::debug!("Skipping {} due to too many previous errors", host);
            return VisitOutcome::HostTripped;
        }

        if !is_same_site(&host, &self.seed_host) {
            self.external_links.record(raw_url);
            return VisitOutcome::External;
        }

        let key = match normalize_parsed(&url) {
            Ok(key) => key,
            Err(e) => {
                self.breaker.record_failure(&host);
                self.stats.record_failure();
                tracing::debug!("Error normalizing URL {}: {}", raw_url, e);
                return VisitOutcome::Malformed;
            }
        };

        match self.pages.check_and_register(&key) {
            Registration::New => {}
            Registration::Duplicate(count) => return VisitOutcome::Duplicate(count),
            Registration::CeilingReached => return VisitOutcome::CeilingReached,
        }

        tracing::info!("Crawling: {}", raw_url);

        let budget = self.fetch_budget();
        if budget.is_zero() {
            self.stats.record_failure();
            tracing::debug!("No time left to fetch {}", raw_url);
            return VisitOutcome::FetchFailed;
        }

        let body = match self.fetch_page(&url, budget).await {
            Ok(body) => {
                self.stats.record_success();
                body
            }
            Err(RetryError::Cancelled)
            | Err(RetryError::NonRetryable(FetchError::Cancelled { .. })) => {
                self.stats.record_failure();
                return VisitOutcome::Cancelled;
            }
            Err(e) => {
                self.breaker.record_failure(&host);
                self.stats.record_failure();
                tracing::warn!("Error getting HTML from {}: {}", raw_url, e);
                return VisitOutcome::FetchFailed;
            }
        };

        // Links are resolved against the page they appear on
        let page = match parse_page(&body, url.as_str()) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Error getting URLs from HTML of {}: {}", raw_url, e);
                return VisitOutcome::Fetched(Vec::new());
            }
        };

        tracing::debug!(
            "Parsed {} ({} links, {} images, h1: {:?})",
            raw_url,
            page.outgoing_links.len(),
            page.image_urls.len(),
            page.h1
        );

        let mut links = page.outgoing_links;
        let max_links = self.policy.max_links_per_page;
        if links.len() > max_links {
            tracing::debug!(
                "Limiting URLs from {} to {} (originally {})",
                raw_url,
                max_links,
                links.len()
            );
            links.truncate(max_links);
        }

        VisitOutcome::Fetched(links)
    }

    /// Fetches a page through the retry executor within `budget`
    ///
    /// The politeness delay applies before the first attempt only. Every
    /// wait, and the fetch itself, is abandoned on cancellation.
    async fn fetch_page(&self, url: &Url, budget: Duration) -> Result<String, RetryError<FetchError>> {
        let delay = self.policy.request_delay();
        let cancel = &self.cancel;
        let fetcher = &self.fetcher;

        let attempts = self.retry.execute(|attempt| async move {
            if attempt == 0 && !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(FetchError::Cancelled { url: url.to_string() });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FetchError::Cancelled { url: url.to_string() }),
                result = fetcher.fetch(url, budget) => result,
            }
        });

        match tokio::time::timeout(budget, attempts).await {
            Ok(result) => result,
            Err(_) => Err(RetryError::NonRetryable(FetchError::Timeout {
                url: url.to_string(),
            })),
        }
    }

    /// Time allowed for the next fetch: the request timeout, cut short by
    /// the end of the run
    fn fetch_budget(&self) -> Duration {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        self.policy.request_timeout().min(remaining)
    }

    pub fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    pub fn external_links(&self) -> &ExternalLinkRegistry {
        &self.external_links
    }

    pub fn breaker(&self) -> &HostCircuitBreaker {
        &self.breaker
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    pub fn work(&self) -> &WorkTracker {
        &self.work
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Roughly thirty years; stands in for a run timeout too large to represent
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// When a run started at `start` must end
///
/// A timeout that overflows the clock ends the run at [`FAR_FUTURE`].
fn run_deadline(start: Instant, run_timeout: Duration) -> Instant {
    start
        .checked_add(run_timeout)
        .unwrap_or_else(|| start + FAR_FUTURE)
}
