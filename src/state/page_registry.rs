use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Outcome of registering a discovered in-domain page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First discovery; the caller owns the single fetch of this page
    New,

    /// Already known; the discovery count was incremented to the given value
    Duplicate(u64),

    /// The page ceiling is reached and the page is unknown; nothing changed
    CeilingReached,
}

/// Registry of in-domain pages keyed by normalized URL
///
/// Maps every registered page to the number of times it was discovered as
/// a link. Entries are never removed during a run.
#[derive(Debug)]
pub struct PageRegistry {
    max_pages: usize,
    pages: Mutex<HashMap<String, u64>>,
}

impl PageRegistry {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            pages: Mutex::new(HashMap::new()),
        }
    }

    /// Checks and registers a page in one critical section
    ///
    /// Known pages always have their count incremented, even once the
    /// ceiling is reached; the ceiling only blocks pages not seen before.
    /// Concurrent callers with the same key therefore see exactly one
    /// [`Registration::New`], and no more than `max_pages` keys are ever
    /// stored.
    pub fn check_and_register(&self, key: &str) -> Registration {
        let mut pages = self.lock();

        if let Some(count) = pages.get_mut(key) {
            *count += 1;
            return Registration::Duplicate(*count);
        }

        if pages.len() >= self.max_pages {
            return Registration::CeilingReached;
        }

        pages.insert(key.to_string(), 1);
        Registration::New
    }

    /// Discovery count of a page, if registered
    pub fn count(&self, key: &str) -> Option<u64> {
        self.lock().get(key).copied()
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
        self.pages.lock().unwrap_or_else(|e| e.into_inner())
    }
}
