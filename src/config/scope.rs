//! Crawl scope configuration: allowed hosts, exceptions and structural limits

use serde::{Deserialize, Serialize};

/// A narrow carve-out into an otherwise excluded host.
///
/// URLs on `host` are in scope only when their path starts with `path_prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeException {
    pub host: String,
    pub path_prefix: String,
}

/// Which URLs the crawler is allowed to enter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Host suffixes that are in scope (`ics.uci.edu` matches itself and any subdomain)
    pub allowed_domain_suffixes: Vec<String>,
    /// File extensions (without the dot) that never point at crawlable text
    pub denied_extensions: Vec<String>,
    /// Maximum number of non-empty path segments
    pub max_path_segments: usize,
    /// Reject paths with this many consecutive purely numeric segments
    pub max_numeric_run: usize,
    /// Host + path prefix pairs admitted outside the allowed suffixes
    pub exceptions: Vec<ScopeException>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            allowed_domain_suffixes: [
                "ics.uci.edu",
                "cs.uci.edu",
                "informatics.uci.edu",
                "stat.uci.edu",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            denied_extensions: default_denied_extensions(),
            max_path_segments: 30,
            max_numeric_run: 3,
            exceptions: vec![ScopeException {
                host: "today.uci.edu".to_string(),
                path_prefix: "/department/information_computer_sciences/".to_string(),
            }],
        }
    }
}

fn default_denied_extensions() -> Vec<String> {
    [
        // stylesheets and scripts
        "css", "js",
        // images
        "bmp", "gif", "jpg", "jpeg", "png", "svg", "ico", "tif", "tiff",
        // audio / video
        "mid", "mp2", "mp3", "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v",
        // documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
        // archives
        "zip", "rar", "gz",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ScopeConfig {
    pub(super) fn collect_errors(&self, errors: &mut Vec<String>) {
        if self.allowed_domain_suffixes.is_empty() {
            errors.push("scope.allowed_domain_suffixes must not be empty".to_string());
        }
        if self
            .allowed_domain_suffixes
            .iter()
            .any(|s| s.trim_matches('.').trim().is_empty())
        {
            errors.push("scope.allowed_domain_suffixes must not contain blank entries".to_string());
        }
        for exception in &self.exceptions {
            if exception.host.trim().is_empty() {
                errors.push("scope.exceptions host must not be empty".to_string());
            }
            if exception.path_prefix.trim().is_empty() {
                errors.push(format!(
                    "scope.exceptions path_prefix for '{}' must not be empty",
                    exception.host
                ));
            }
        }
        if self.max_path_segments == 0 {
            errors.push("scope.max_path_segments must be positive".to_string());
        }
        if self.max_numeric_run == 0 {
            errors.push("scope.max_numeric_run must be positive".to_string());
        }
    }
}
