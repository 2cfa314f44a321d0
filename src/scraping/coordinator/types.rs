//! Coordinator types: configuration and crawl-loop statistics

use serde::Serialize;
use std::time::Duration;

/// Configuration for the crawl loop
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum concurrent fetches
    pub max_concurrent_fetches: usize,
    /// Stop dispatching after this many fetches (0 = no limit)
    pub max_pages: usize,
    /// Minimum delay between requests to the same host
    pub politeness_delay: Duration,
    /// How long to sleep when no URL is ready
    pub idle_interval: Duration,
}

impl CoordinatorConfig {
    /// Build from the crawl section of the config file
    pub fn from_config(config: &crate::config::CrawlConfig) -> Self {
        Self {
            max_concurrent_fetches: config.max_concurrent_fetches,
            max_pages: config.max_pages,
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
            ..Self::default()
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            max_pages: 0,
            politeness_delay: Duration::from_millis(500),
            idle_interval: Duration::from_millis(50),
        }
    }
}

/// Counters kept by the crawl loop (page content statistics live in
/// `crate::stats::CrawlStatistics`)
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Fetches attempted
    pub fetches: u64,
    /// Fetches that failed at the transport level
    pub fetch_failures: u64,
    /// Pages whose content was recorded
    pub pages_recorded: u64,
    /// Responses not recorded (non-200, non-HTML, unparsable, out of scope, already recorded)
    pub pages_skipped: u64,
    /// Raw links found on fetched pages
    pub links_discovered: u64,
    /// Links admitted to the frontier
    pub links_admitted: u64,
    /// URLs waiting in the queue
    pub queue_size: usize,
}
