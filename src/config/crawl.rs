//! Outer crawl loop configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::DEFAULT_USER_AGENT;

/// Settings for the fetch loop that drives the decision core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed URLs used when none are given on the command line
    pub seeds: Vec<String>,
    /// Maximum concurrent fetches
    pub max_concurrent_fetches: usize,
    /// Minimum delay between two requests to the same host (milliseconds)
    pub politeness_delay_ms: u64,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
    /// Stop after this many fetched pages (0 = no limit)
    pub max_pages: usize,
    /// Responses larger than this many bytes are discarded
    pub max_content_size: usize,
    /// Where to write the final report, if anywhere
    pub report_path: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seeds: vec![
                "https://www.ics.uci.edu".to_string(),
                "https://www.cs.uci.edu".to_string(),
                "https://www.informatics.uci.edu".to_string(),
                "https://www.stat.uci.edu".to_string(),
            ],
            max_concurrent_fetches: 4,
            politeness_delay_ms: 500,
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: 0,
            max_content_size: 10 * 1024 * 1024,
            report_path: None,
        }
    }
}

impl CrawlConfig {
    pub(super) fn collect_errors(&self, errors: &mut Vec<String>) {
        if self.max_concurrent_fetches == 0 {
            errors.push("crawl.max_concurrent_fetches must be positive".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("crawl.request_timeout_secs must be positive".to_string());
        }
        if self.max_content_size == 0 {
            errors.push("crawl.max_content_size must be positive".to_string());
        }
        if self.user_agent.trim().is_empty() {
            errors.push("crawl.user_agent must not be empty".to_string());
        }
    }
}
