//! Crawl trap detection
//!
//! Detects URL patterns that generate unbounded or low-value crawl space:
//! - Calendar navigation (`?month=`, `/2024/05`, `/2024-05-01`, `/05-01-2024`)
//! - Known low-value path substrings (wiki change browsers, VCS browsers, personal pages)
//! - Known low-value query parameters (calendar exports, event-date filters)
//! - Extremely long URLs
//! - Repetitive path patterns (e.g., /a/b/a/b/a/b)
//!
//! Each signature is checked independently and the first match wins. This is
//! a heuristic filter: traps that slip through only cost crawl efficiency.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::config::TrapConfig;

/// Which trap signature a URL matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    CalendarQuery,
    DatePath,
    LowValuePath,
    LowValueQuery,
    UrlTooLong,
    RepetitivePath,
}

impl fmt::Display for TrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CalendarQuery => "calendar query",
            Self::DatePath => "date path",
            Self::LowValuePath => "low-value path",
            Self::LowValueQuery => "low-value query",
            Self::UrlTooLong => "url too long",
            Self::RepetitivePath => "repetitive path",
        };
        f.write_str(name)
    }
}

/// Compiled trap signatures
#[derive(Debug, Clone)]
pub struct TrapDetector {
    calendar_params: HashSet<String>,
    date_patterns: Vec<Regex>,
    path_substrings: Vec<String>,
    query_params: HashSet<String>,
    max_url_length: usize,
    max_repeated_segments: usize,
}

impl TrapDetector {
    /// Compile the trap policy. Fails on an invalid date pattern.
    pub fn new(config: &TrapConfig) -> Result<Self, regex::Error> {
        let date_patterns = config
            .date_path_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            calendar_params: lowercase_set(&config.calendar_query_params),
            date_patterns,
            path_substrings: config
                .path_substrings
                .iter()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            query_params: lowercase_set(&config.query_params),
            max_url_length: config.max_url_length,
            max_repeated_segments: config.max_repeated_segments,
        })
    }

    /// Return the first trap signature the URL matches, if any
    pub fn detect(&self, url: &Url) -> Option<TrapKind> {
        if url.as_str().len() > self.max_url_length {
            return Some(TrapKind::UrlTooLong);
        }

        let query_keys: Vec<String> = url
            .query_pairs()
            .map(|(k, _)| k.to_lowercase())
            .collect();

        if query_keys.iter().any(|k| self.calendar_params.contains(k)) {
            return Some(TrapKind::CalendarQuery);
        }

        let path = url.path();
        if self.date_patterns.iter().any(|re| re.is_match(path)) {
            return Some(TrapKind::DatePath);
        }

        let path_lower = path.to_lowercase();
        if self
            .path_substrings
            .iter()
            .any(|s| path_lower.contains(s.as_str()))
        {
            return Some(TrapKind::LowValuePath);
        }

        if query_keys.iter().any(|k| self.query_params.contains(k)) {
            return Some(TrapKind::LowValueQuery);
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if has_repetitive_pattern(&segments, self.max_repeated_segments) {
            return Some(TrapKind::RepetitivePath);
        }

        None
    }

    /// Detect if a URL is likely a crawl trap
    pub fn is_trap(&self, url: &Url) -> bool {
        self.detect(url).is_some()
    }
}

fn lowercase_set(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn has_repetitive_pattern(segments: &[&str], max_repeats: usize) -> bool {
    if segments.len() < 4 {
        return false;
    }

    for window_size in 1..=segments.len() / 2 {
        let mut repeat_count = 0;
        for i in 0..segments.len() - window_size {
            if segments[i] == segments[i + window_size] {
                repeat_count += 1;
                if repeat_count >= max_repeats {
                    return true;
                }
            }
        }
    }

    false
}
