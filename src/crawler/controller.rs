//! Run controller - seeds a crawl and decides when it ends
//!
//! A run ends on whichever comes first:
//! - the outstanding-work counter reaching zero
//! - an external shutdown signal
//! - the global run timeout
//!
//! After that the run is cancelled, in-flight tasks get a grace period to
//! unwind, and the shared state is snapshotted into a [`CrawlReport`].

use crate::config::{validate, RunPolicy};
use crate::crawler::engine::CrawlEngine;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::state::StatsSnapshot;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How a run came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every scheduled task finished
    Completed,
    /// The run timeout elapsed first
    TimedOut,
    /// A shutdown signal arrived first
    Interrupted,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::TimedOut => write!(f, "timed out"),
            RunOutcome::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Read-only snapshot of a finished run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The seed URL as parsed
    pub seed_url: String,
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Normalized page key to discovery count
    pub pages: HashMap<String, u64>,
    /// Exact external URL to discovery count
    pub external_links: HashMap<String, u64>,
    pub stats: StatsSnapshot,
    /// Host to failure count
    pub host_errors: HashMap<String, u64>,
    /// Whether every task finished within the shutdown grace period
    pub unwound: bool,
}

/// Owns one crawl run from seeding to report
pub struct RunController {
    policy: RunPolicy,
    fetcher: Arc<dyn PageFetcher>,
}

impl RunController {
    /// Creates a controller that fetches over HTTP
    pub fn new(policy: RunPolicy) -> Result<Self, CrawlError> {
        validate(&policy)?;
        let fetcher = HttpFetcher::from_policy(&policy)?;
        Ok(Self {
            policy,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Creates a controller around any [`PageFetcher`]
    pub fn with_fetcher(policy: RunPolicy, fetcher: Arc<dyn PageFetcher>) -> Result<Self, CrawlError> {
        validate(&policy)?;
        Ok(Self { policy, fetcher })
    }

    pub fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    /// Runs the crawl until it completes, times out or `shutdown` resolves
    ///
    /// Only a seed URL that cannot be used fails the run. Everything else,
    /// including timeouts and interrupts, produces a report over what was
    /// discovered so far.
    pub async fn run<S>(self, shutdown: S) -> Result<CrawlReport, CrawlError>
    where
        S: Future<Output = ()>,
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        let run_timeout = self.policy.run_timeout();
        let grace = self.policy.shutdown_grace();

        let cancel = CancellationToken::new();
        let engine = CrawlEngine::new(self.policy, self.fetcher, cancel.clone())?;

        tracing::info!(
            "Starting crawl of {} (max concurrency {}, max pages {})",
            engine.seed(),
            engine.policy().max_concurrency,
            engine.policy().max_pages
        );

        engine.schedule(engine.seed().to_string());

        let outcome = tokio::select! {
            _ = engine.work().wait_idle() => RunOutcome::Completed,
            _ = shutdown => {
                tracing::warn!("Shutdown signal received, stopping crawl");
                RunOutcome::Interrupted
            }
            _ = tokio::time::sleep(run_timeout) => {
                tracing::warn!("Crawl timed out after {:?}", run_timeout);
                RunOutcome::TimedOut
            }
        };

        cancel.cancel();

        let unwound = tokio::time::timeout(grace, engine.work().wait_idle())
            .await
            .is_ok();
        if !unwound {
            tracing::warn!(
                "{} tasks still running after {:?} grace period",
                engine.work().outstanding(),
                grace
            );
        }

        let report = CrawlReport {
            seed_url: engine.seed().to_string(),
            outcome,
            started_at,
            elapsed: clock.elapsed(),
            pages: engine.pages().snapshot(),
            external_links: engine.external_links().snapshot(),
            stats: engine.stats().snapshot(),
            host_errors: engine.breaker().snapshot(),
            unwound,
        };

        tracing::info!(
            "Crawl {} in {:.2}s: {} pages, {} external links",
            report.outcome,
            report.elapsed.as_secs_f64(),
            report.pages.len(),
            report.external_links.len()
        );

        Ok(report)
    }
}

/// Crawls `policy.seed_url` over HTTP, stopping on Ctrl-C or SIGTERM
pub async fn run_crawl(policy: RunPolicy) -> Result<CrawlReport, CrawlError> {
    RunController::new(policy)?.run(shutdown_signal()).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
