use std::sync::atomic::{AtomicU64, Ordering};

/// Fetch attempt counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    total: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`CrawlStatistics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub failed_requests: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.total.load(Ordering::Relaxed),
            failed_requests: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    pub fn successful_requests(&self) -> u64 {
        self.total_requests.saturating_sub(self.failed_requests)
    }

    /// Percentage of successful attempts, `None` when nothing was attempted
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_requests == 0 {
            return None;
        }
        Some(self.successful_requests() as f64 / self.total_requests as f64 * 100.0)
    }
}
