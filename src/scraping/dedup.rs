//! Frontier deduplication
//!
//! `UrlDeduplicator` is the single source of truth for "has this URL been
//! enqueued". Admission is atomic and monotonic: a URL is admitted at most
//! once for the lifetime of the deduplicator and is never evicted.

use parking_lot::Mutex;
use std::collections::HashSet;
use url::Url;

/// Set of canonical URLs already accepted into the frontier
#[derive(Debug, Default)]
pub struct UrlDeduplicator {
    /// Canonical URL strings seen so far
    seen: Mutex<HashSet<String>>,
}

impl UrlDeduplicator {
    /// Create an empty deduplicator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty deduplicator with room for `capacity` URLs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: Mutex::new(HashSet::with_capacity(capacity)),
        }
    }

    /// Record a canonical URL. Returns `true` the first time a URL is seen
    /// and `false` on every later call, no matter which thread makes it.
    pub fn admit(&self, url: &Url) -> bool {
        self.seen.lock().insert(url.as_str().to_string())
    }

    /// Check membership without admitting
    pub fn contains(&self, url: &Url) -> bool {
        self.seen.lock().contains(url.as_str())
    }

    /// Get the number of URLs admitted
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}
