//! Crawl trap signatures
//!
//! These lists are policy data tuned to one site family; retune them per
//! deployment rather than editing the detector.

use serde::{Deserialize, Serialize};

/// Trap detection policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapConfig {
    /// Query parameter names that drive calendar/date navigation
    pub calendar_query_params: Vec<String>,
    /// Regexes matched against the URL path that identify date-shaped segments
    pub date_path_patterns: Vec<String>,
    /// Path substrings of known low-value URL spaces (wikis, VCS browsers, personal pages)
    pub path_substrings: Vec<String>,
    /// Query parameter names of known low-value URL spaces
    pub query_params: Vec<String>,
    /// Maximum URL length in characters
    pub max_url_length: usize,
    /// Number of repeated path segments that marks a looping URL
    pub max_repeated_segments: usize,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            calendar_query_params: strings(&["month", "year", "date"]),
            date_path_patterns: strings(&[
                // YYYY/M or YYYY/MM
                r"(?:^|/)\d{4}/\d{1,2}(?:/|$)",
                // M-D-YYYY
                r"\b\d{1,2}-\d{1,2}-\d{4}\b",
                // YYYY-M-D
                r"\b\d{4}-\d{1,2}-\d{1,2}\b",
            ]),
            path_substrings: strings(&[
                "doku.php",
                "/wiki/",
                "/gitlab/",
                "/-/commit",
                "/-/blob",
                "/-/tree",
                "/svn/",
                "/trac/",
                "/timeline",
                "/changeset",
                "/~",
            ]),
            query_params: strings(&[
                "ical",
                "outlook-ical",
                "tribe-bar-date",
                "eventdisplay",
                "do",
                "rev",
                "idx",
                "share",
                "replytocom",
            ]),
            max_url_length: 2048,
            max_repeated_segments: 3,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl TrapConfig {
    pub(super) fn collect_errors(&self, errors: &mut Vec<String>) {
        for pattern in &self.date_path_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                errors.push(format!("traps.date_path_patterns '{}' is invalid: {}", pattern, e));
            }
        }
        if self.max_url_length == 0 {
            errors.push("traps.max_url_length must be positive".to_string());
        }
        if self.max_repeated_segments == 0 {
            errors.push("traps.max_repeated_segments must be positive".to_string());
        }
    }
}
