//! Work queue for admitted URLs
//!
//! Only URLs that already passed `CrawlCore::filter_links` (and were therefore
//! admitted by the deduplicator exactly once) are pushed here, so the queue
//! itself never has to check for duplicates. Breadth-first order.

use std::collections::VecDeque;
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: Url,
    /// Hops from a seed URL
    pub depth: u32,
}

/// FIFO of admitted URLs
#[derive(Debug, Default)]
pub struct CrawlQueue {
    pending: VecDeque<QueuedUrl>,
    /// Total URLs ever pushed
    enqueued: u64,
}

impl CrawlQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: Url, depth: u32) {
        self.enqueued += 1;
        self.pending.push_back(QueuedUrl { url, depth });
    }

    pub fn extend(&mut self, urls: impl IntoIterator<Item = Url>, depth: u32) {
        for url in urls {
            self.push(url, depth);
        }
    }

    pub fn pop(&mut self) -> Option<QueuedUrl> {
        self.pending.pop_front()
    }

    /// Pop the first URL whose host passes `ready`, leaving the rest in order
    pub fn pop_ready(&mut self, mut ready: impl FnMut(&Url) -> bool) -> Option<QueuedUrl> {
        let index = self.pending.iter().position(|q| ready(&q.url))?;
        self.pending.remove(index)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn total_enqueued(&self) -> u64 {
        self.enqueued
    }
}
