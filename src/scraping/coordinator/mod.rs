//! Crawl coordination
//!
//! `CrawlCore` is the synchronous decision core: it owns the scope filter,
//! trap detector and stopword set, and holds the two pieces of shared state
//! (frontier deduplicator, page statistics) that every worker writes to.
//! `CrawlCoordinator` is the outer async loop that fetches pages and feeds
//! them through the core.

mod pipeline;
mod types;
mod url_filter;

pub use types::*;

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, Semaphore};
use url::Url;

use super::{
    dedup::UrlDeduplicator,
    extractor::{PageContent, SkipReason, StopwordSet},
    fetcher::{FetchConfig, FetchEngine, FetchResult},
    frontier::{CrawlQueue, QueuedUrl},
    normalize_absolute,
    politeness::PolitenessController,
    scope::ScopeFilter,
    trap_detection::TrapDetector,
    RejectReason,
};
use crate::config::Config;
use crate::stats::{CrawlStatistics, Report};

/// Link filtering, page processing and reporting for one crawl
pub struct CrawlCore {
    scope: ScopeFilter,
    traps: TrapDetector,
    stopwords: StopwordSet,
    /// URLs ever admitted to the frontier
    dedup: Arc<UrlDeduplicator>,
    /// Aggregated page statistics
    stats: Arc<CrawlStatistics>,
}

impl CrawlCore {
    /// Build a core with fresh, empty shared state. Fails if the
    /// configuration does not validate.
    pub fn new(config: &Config) -> Result<Self> {
        let dedup = Arc::new(UrlDeduplicator::new());
        let stats = Arc::new(CrawlStatistics::new(config.tokens.top_words));
        Self::with_state(config, dedup, stats)
    }

    /// Build a core around existing shared state
    pub fn with_state(
        config: &Config,
        dedup: Arc<UrlDeduplicator>,
        stats: Arc<CrawlStatistics>,
    ) -> Result<Self> {
        config.validate()?;

        let traps = TrapDetector::new(&config.traps).context("Failed to compile trap patterns")?;

        Ok(Self {
            scope: ScopeFilter::new(&config.scope),
            traps,
            stopwords: StopwordSet::from_config(&config.tokens),
            dedup,
            stats,
        })
    }

    /// Resolve `raw_links` against `base` and return the URLs newly admitted
    /// to the frontier, in the order they were first encountered.
    ///
    /// Unparsable, out-of-scope, trap and already-seen links are dropped.
    pub fn filter_links<S: AsRef<str>>(&self, base: &Url, raw_links: &[S]) -> Vec<Url> {
        let admitted =
            url_filter::filter_links(base, raw_links, &self.scope, &self.traps, &self.dedup);

        tracing::debug!(
            "{}: admitted {} of {} links",
            base,
            admitted.len(),
            raw_links.len()
        );

        admitted
    }

    /// Run one raw link through the filter pipeline, admitting it if it passes
    pub fn evaluate_link(&self, base: &Url, raw: &str) -> Result<Url, RejectReason> {
        url_filter::evaluate_link(base, raw, &self.scope, &self.traps, &self.dedup)
    }

    /// Scope and trap verdict for a canonical URL without admitting it
    pub fn classify(&self, url: &Url) -> Result<(), RejectReason> {
        url_filter::classify(url, &self.scope, &self.traps)
    }

    /// Admit a seed URL. Seeds go through the same checks as discovered links.
    pub fn admit_seed(&self, raw: &str) -> Result<Url, RejectReason> {
        let url = normalize_absolute(raw).map_err(|e| {
            tracing::warn!("Invalid seed: {}", e);
            RejectReason::Unparsable
        })?;
        self.evaluate_link(&url, url.as_str())
    }

    /// Extract a fetched page, record its statistics and return its raw links.
    ///
    /// Non-200, non-HTML and unparsable responses produce no record and no
    /// links. A response whose post-redirect URL left the crawl scope is
    /// treated the same way.
    pub fn process_page(&self, result: &FetchResult) -> Vec<String> {
        self.extract_and_record(result).0.into_parts().0
    }

    /// Same as `process_page` but keeps the extraction outcome, along with
    /// whether the page was newly added to the statistics
    pub fn extract_and_record(&self, result: &FetchResult) -> (PageContent, bool) {
        let page_url = pipeline::page_url(result);

        if page_url != result.requested_url {
            if let Err(reason) = self.classify(&page_url) {
                tracing::debug!(
                    "{} redirected to {} ({})",
                    result.requested_url,
                    page_url,
                    reason
                );
                let skipped = SkipReason::OutOfScope(page_url.to_string());
                return (PageContent::Skipped(skipped), false);
            }
            // Redirect target: mark it seen so it is not fetched again later
            self.dedup.admit(&page_url);
        }

        let (content, record) = pipeline::extract(result, &self.stopwords);

        let mut recorded = false;
        if let Some(record) = record {
            let token_count = record.token_count;
            recorded = self.stats.record(record);
            if recorded {
                tracing::debug!("Recorded {} ({} tokens)", page_url, token_count);
            } else {
                tracing::trace!("{} already recorded", page_url);
            }
        }

        (content, recorded)
    }

    /// Render the current statistics as text
    pub fn report(&self) -> String {
        self.stats.render()
    }

    /// Structured view of the current statistics
    pub fn snapshot(&self) -> Report {
        self.stats.snapshot()
    }

    pub fn stats(&self) -> &Arc<CrawlStatistics> {
        &self.stats
    }

    pub fn dedup(&self) -> &Arc<UrlDeduplicator> {
        &self.dedup
    }
}

/// Async crawl loop: frontier queue, politeness, bounded concurrent fetching
pub struct CrawlCoordinator {
    config: CoordinatorConfig,
    core: Arc<CrawlCore>,
    fetcher: Arc<FetchEngine>,
    queue: Arc<Mutex<CrawlQueue>>,
    politeness: Arc<Mutex<PolitenessController>>,
    stats: Arc<RwLock<CrawlStats>>,
    /// Running flag (lock-free)
    running: Arc<AtomicBool>,
    /// Pages currently being fetched or processed
    in_flight: Arc<AtomicUsize>,
}

impl CrawlCoordinator {
    pub fn new(core: Arc<CrawlCore>, fetcher: FetchEngine, config: CoordinatorConfig) -> Self {
        let politeness = PolitenessController::new(config.politeness_delay);
        Self {
            config,
            core,
            fetcher: Arc::new(fetcher),
            queue: Arc::new(Mutex::new(CrawlQueue::new())),
            politeness: Arc::new(Mutex::new(politeness)),
            stats: Arc::new(RwLock::new(CrawlStats::default())),
            running: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Build the core, fetch engine and loop from a validated config
    pub fn from_config(config: &Config) -> Result<Self> {
        let core = Arc::new(CrawlCore::new(config)?);
        let fetcher = FetchEngine::new(FetchConfig::from_config(&config.crawl))
            .context("Failed to build HTTP client")?;
        Ok(Self::new(
            core,
            fetcher,
            CoordinatorConfig::from_config(&config.crawl),
        ))
    }

    /// Queue seed URLs, returning how many were admitted
    pub async fn add_seeds<S: AsRef<str>>(&self, seeds: &[S]) -> usize {
        let mut queue = self.queue.lock().await;
        let mut admitted = 0;

        for seed in seeds {
            match self.core.admit_seed(seed.as_ref()) {
                Ok(url) => {
                    queue.push(url, 0);
                    admitted += 1;
                }
                Err(reason) => {
                    tracing::warn!("Seed {} rejected: {}", seed.as_ref(), reason);
                }
            }
        }

        admitted
    }

    /// Pop the next URL whose host is past its politeness delay
    async fn next_url(&self) -> Option<QueuedUrl> {
        let mut queue = self.queue.lock().await;
        let mut politeness = self.politeness.lock().await;

        let next = queue.pop_ready(|url| politeness.is_ready(url.host_str().unwrap_or_default()))?;
        politeness.record_fetch(next.url.host_str().unwrap_or_default());
        Some(next)
    }

    /// Fetch one URL and push its admitted links onto the queue
    async fn process_url(&self, queued: QueuedUrl) {
        {
            let mut stats = self.stats.write().await;
            stats.fetches += 1;
        }

        let result = match self.fetcher.fetch(&queued.url).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", queued.url, e);
                let mut stats = self.stats.write().await;
                stats.fetch_failures += 1;
                return;
            }
        };

        // HTML parsing is CPU-bound; keep it off the async workers
        let core = Arc::clone(&self.core);
        let outcome = tokio::task::spawn_blocking(move || {
            let (content, recorded) = core.extract_and_record(&result);
            let links = content.into_parts().0;
            let admitted = core.filter_links(&result.final_url, &links);
            (recorded, links.len(), admitted)
        })
        .await;

        let (recorded, discovered, admitted) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Processing task for {} failed: {}", queued.url, e);
                return;
            }
        };

        {
            let mut stats = self.stats.write().await;
            if recorded {
                stats.pages_recorded += 1;
            } else {
                stats.pages_skipped += 1;
            }
            stats.links_discovered += discovered as u64;
            stats.links_admitted += admitted.len() as u64;
        }

        tracing::debug!(
            "Processed {} - {} links, {} new",
            queued.url,
            discovered,
            admitted.len()
        );

        let mut queue = self.queue.lock().await;
        queue.extend(admitted, queued.depth + 1);
    }

    /// Run the crawl until the frontier drains, `max_pages` is reached or
    /// `stop` is called. Waits for in-flight pages before returning.
    pub async fn run(self: &Arc<Self>) {
        self.running.store(true, Ordering::SeqCst);

        let max_concurrent = self.config.max_concurrent_fetches.max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut dispatched = 0usize;

        tracing::info!(
            "Starting crawl (max_concurrent_fetches={}, max_pages={})",
            max_concurrent,
            self.config.max_pages
        );

        while self.running.load(Ordering::SeqCst) {
            if self.config.max_pages > 0 && dispatched >= self.config.max_pages {
                tracing::info!("Reached max_pages ({})", self.config.max_pages);
                break;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            match self.next_url().await {
                Some(queued) => {
                    dispatched += 1;
                    self.in_flight.fetch_add(1, Ordering::SeqCst);

                    let coordinator = Arc::clone(self);
                    tokio::spawn(async move {
                        let _permit = permit;
                        coordinator.process_url(queued).await;
                        coordinator.in_flight.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                None => {
                    drop(permit);

                    // Workers push their links before leaving in_flight, so
                    // in_flight must be read before the queue.
                    let in_flight = self.in_flight.load(Ordering::SeqCst);
                    let queue_empty = self.queue.lock().await.is_empty();
                    if in_flight == 0 && queue_empty {
                        tracing::info!("Frontier exhausted");
                        break;
                    }

                    tokio::time::sleep(self.idle_wait(queue_empty).await).await;
                }
            }
        }

        // Drain: every permit back means every spawned task finished
        let _ = semaphore.acquire_many(max_concurrent as u32).await;
        self.running.store(false, Ordering::SeqCst);

        tracing::info!("Crawl stopped after {} fetches", dispatched);
    }

    /// How long the loop sleeps when no URL could be dispatched. With URLs
    /// queued behind busy hosts, wake when the first host frees up.
    async fn idle_wait(&self, queue_empty: bool) -> Duration {
        let idle = self.config.idle_interval;
        if queue_empty {
            return idle;
        }
        self.politeness
            .lock()
            .await
            .next_ready_in()
            .map_or(idle, |wait| wait.min(idle))
    }

    /// Stop dispatching new fetches
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current loop counters
    pub async fn stats(&self) -> CrawlStats {
        let mut stats = self.stats.read().await.clone();
        stats.queue_size = self.queue.lock().await.pending_count();
        stats
    }

    pub fn core(&self) -> &Arc<CrawlCore> {
        &self.core
    }
}
