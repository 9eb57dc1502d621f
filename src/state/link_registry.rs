use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Registry of links that leave the crawled site
///
/// Keys are the exact URL strings as discovered, not normalized. These
/// links are counted but never fetched.
#[derive(Debug, Default)]
pub struct ExternalLinkRegistry {
    links: Mutex<HashMap<String, u64>>,
}

impl ExternalLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one discovery and returns the new count
    pub fn record(&self, raw_url: &str) -> u64 {
        let mut links = self.lock();
        let count = links.entry(raw_url.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, raw_url: &str) -> Option<u64> {
        self.lock().get(raw_url).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the registry for reporting
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.links.lock().unwrap_or_else(|e| e.into_inner())
    }
}
