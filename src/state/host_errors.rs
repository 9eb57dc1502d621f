use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Per-host circuit breaker
///
/// Counts failures per host and vetoes further requests once a host reaches
/// the threshold. There is no half-open state: a tripped host stays tripped
/// for the rest of the run.
#[derive(Debug)]
pub struct HostCircuitBreaker {
    threshold: u64,
    failures: RwLock<HashMap<String, Arc<AtomicU64>>>,
}

impl HostCircuitBreaker {
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            failures: RwLock::new(HashMap::new()),
        }
    }

    /// Records one failure for `host` and returns the new count
    pub fn record_failure(&self, host: &str) -> u64 {
        // Fast path: the counter already exists
        {
            let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
            if let Some(counter) = failures.get(host) {
                return counter.fetch_add(1, Ordering::SeqCst) + 1;
            }
        }

        let mut failures = self.failures.write().unwrap_or_else(|e| e.into_inner());
        let counter = failures
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)));
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `host` has reached the failure threshold
    pub fn is_tripped(&self, host: &str) -> bool {
        self.failure_count(host) >= self.threshold
    }

    pub fn failure_count(&self, host: &str) -> u64 {
        let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
        failures
            .get(host)
            .map_or(0, |counter| counter.load(Ordering::SeqCst))
    }

    /// Host to failure count, for reporting
    pub fn snapshot(&self) -> HashMap<String, u64> {
        let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
        failures
            .iter()
            .map(|(host, counter)| (host.clone(), counter.load(Ordering::SeqCst)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_unknown_host_is_not_tripped() {
        let breaker = HostCircuitBreaker::new(10);
        assert!(!breaker.is_tripped("example.com"));
        assert_eq!(breaker.failure_count("example.com"), 0);
    }

    #[test]
    fn test_trips_at_threshold() {
        let breaker = HostCircuitBreaker::new(3);
        breaker.record_failure("example.com");
        breaker.record_failure("example.com");
        assert!(!breaker.is_tripped("example.com"));

        assert_eq!(breaker.record_failure("example.com"), 3);
        assert!(breaker.is_tripped("example.com"));
    }

    #[test]
    fn test_hosts_are_independent() {
        let breaker = HostCircuitBreaker::new(1);
        breaker.record_failure("bad.example.com");
        assert!(breaker.is_tripped("bad.example.com"));
        assert!(!breaker.is_tripped("good.example.com"));
    }

    #[test]
    fn test_stays_tripped() {
        let breaker = HostCircuitBreaker::new(2);
        breaker.record_failure("example.com");
        breaker.record_failure("example.com");
        breaker.record_failure("example.com");
        assert!(breaker.is_tripped("example.com"));
        assert_eq!(breaker.snapshot().get("example.com"), Some(&3));
    }

    #[test]
    fn test_concurrent_failures_are_all_counted() {
        let breaker = Arc::new(HostCircuitBreaker::new(1000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let breaker = Arc::clone(&breaker);
                thread::spawn(move || {
                    for _ in 0..100 {
                        breaker.record_failure("example.com");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(breaker.failure_count("example.com"), 800);
    }
}
