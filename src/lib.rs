//! focuscrawl: a focused web crawler for a fixed family of academic hosts
//!
//! - URL normalization, scope filtering and crawl-trap detection
//! - At-most-once admission into the crawl frontier
//! - Link and token extraction from fetched HTML
//! - Aggregated crawl statistics (unique pages, longest page, top words,
//!   pages per subdomain)
//! - A bounded-concurrency, per-host polite crawl loop on tokio

pub mod config;
pub mod scraping;
pub mod stats;
pub mod util;

pub use config::Config;
pub use scraping::{CrawlCoordinator, CrawlCore};
pub use stats::{CrawlStatistics, PageRecord, Report};
