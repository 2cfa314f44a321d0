//! Scope and extension filtering
//!
//! A URL is in scope when its scheme is http(s), its path does not end in a
//! denied extension, its path structure is bounded, and its host is either
//! under an allowed suffix or an exception host with the required path prefix.
//! Each check is independent; the first failing one decides the reason.

use std::collections::HashSet;
use url::Url;

use super::RejectReason;
use crate::config::{ScopeConfig, ScopeException};

/// Compiled form of `ScopeConfig`
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    /// Lowercased suffixes without a leading dot
    suffixes: Vec<String>,
    exceptions: Vec<ScopeException>,
    /// Lowercased extensions without the dot
    denied_extensions: HashSet<String>,
    max_path_segments: usize,
    max_numeric_run: usize,
}

impl ScopeFilter {
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            suffixes: config
                .allowed_domain_suffixes
                .iter()
                .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            exceptions: config
                .exceptions
                .iter()
                .map(|e| ScopeException {
                    host: e.host.trim().to_ascii_lowercase(),
                    path_prefix: e.path_prefix.to_lowercase(),
                })
                .collect(),
            denied_extensions: config
                .denied_extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_path_segments: config.max_path_segments,
            max_numeric_run: config.max_numeric_run,
        }
    }

    /// Check a canonical URL against the scope rules
    pub fn check(&self, url: &Url) -> Result<(), RejectReason> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RejectReason::UnsupportedScheme);
        }

        let path = url.path();
        if self.has_denied_extension(path) {
            return Err(RejectReason::DeniedExtension);
        }

        self.check_structure(path)?;

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if self.host_allowed(&host) || self.exception_allows(&host, path) {
            Ok(())
        } else {
            Err(RejectReason::OutOfScope)
        }
    }

    /// Convenience wrapper over `check`
    pub fn is_in_scope(&self, url: &Url) -> bool {
        self.check(url).is_ok()
    }

    fn has_denied_extension(&self, path: &str) -> bool {
        let last_segment = path.rsplit('/').next().unwrap_or_default();
        match last_segment.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => {
                self.denied_extensions.contains(&ext.to_ascii_lowercase())
            }
            _ => false,
        }
    }

    /// Guard against deeply nested pagination and ID trees
    fn check_structure(&self, path: &str) -> Result<(), RejectReason> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() > self.max_path_segments {
            return Err(RejectReason::TooManySegments);
        }

        let mut run = 0;
        for segment in &segments {
            if segment.bytes().all(|b| b.is_ascii_digit()) {
                run += 1;
                if run >= self.max_numeric_run {
                    return Err(RejectReason::NumericRun);
                }
            } else {
                run = 0;
            }
        }
        Ok(())
    }

    fn host_allowed(&self, host: &str) -> bool {
        self.suffixes.iter().any(|suffix| {
            host == suffix
                || (host.len() > suffix.len()
                    && host.ends_with(suffix.as_str())
                    && host.as_bytes()[host.len() - suffix.len() - 1] == b'.')
        })
    }

    fn exception_allows(&self, host: &str, path: &str) -> bool {
        let path = path.to_lowercase();
        self.exceptions
            .iter()
            .any(|e| e.host == host && path.starts_with(&e.path_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ScopeFilter {
        ScopeFilter::new(&ScopeConfig::default())
    }

    fn check(raw: &str) -> Result<(), RejectReason> {
        filter().check(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_allowed_subdomains_accepted() {
        assert!(check("http://test.ics.uci.edu/robots.txt").is_ok());
        assert!(check("http://test.cs.uci.edu/robots.txt").is_ok());
        assert!(check("http://test.informatics.uci.edu/robots.txt").is_ok());
        assert!(check("http://test.stat.uci.edu/robots.txt").is_ok());
    }

    #[test]
    fn test_bare_suffix_host_accepted() {
        assert!(check("https://ics.uci.edu/events").is_ok());
    }

    #[test]
    fn test_suffix_must_align_on_label_boundary() {
        assert_eq!(check("https://physics.uci.edu/"), Err(RejectReason::OutOfScope));
        assert_eq!(check("https://uci.edu/"), Err(RejectReason::OutOfScope));
    }

    #[test]
    fn test_exception_host_requires_prefix() {
        assert!(check("http://today.uci.edu/department/information_computer_sciences/x").is_ok());
        assert_eq!(
            check("http://today.uci.edu/other/x"),
            Err(RejectReason::OutOfScope)
        );
        assert_eq!(
            check("http://today.uci.edu/cs121/information_computer_sciences/robots.txt"),
            Err(RejectReason::OutOfScope)
        );
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert_eq!(
            check("ftp://ftp.ics.uci.edu/pub/readme"),
            Err(RejectReason::UnsupportedScheme)
        );
        assert_eq!(
            check("mailto:someone@ics.uci.edu"),
            Err(RejectReason::UnsupportedScheme)
        );
    }

    #[test]
    fn test_denied_extension_rejected_regardless_of_domain() {
        assert_eq!(
            check("https://www.ics.uci.edu/slides/lecture1.PDF"),
            Err(RejectReason::DeniedExtension)
        );
        assert_eq!(
            check("https://example.com/archive.tar.gz"),
            Err(RejectReason::DeniedExtension)
        );
        assert!(check("https://www.ics.uci.edu/pdf/overview").is_ok());
    }

    #[test]
    fn test_extension_in_query_does_not_count() {
        assert!(check("https://www.ics.uci.edu/view?file=a.pdf").is_ok());
    }

    #[test]
    fn test_numeric_run_rejected() {
        assert_eq!(
            check("https://www.ics.uci.edu/a/1/2/3"),
            Err(RejectReason::NumericRun)
        );
        assert_eq!(
            check("https://www.ics.uci.edu/a/1/2/3/4/b"),
            Err(RejectReason::NumericRun)
        );
        assert!(check("https://www.ics.uci.edu/a/1/b/2/c/3").is_ok());
    }

    #[test]
    fn test_too_many_segments_rejected() {
        let path = "seg/".repeat(31);
        assert_eq!(
            check(&format!("https://www.ics.uci.edu/{}", path)),
            Err(RejectReason::TooManySegments)
        );
    }

    #[test]
    fn test_custom_configuration() {
        let config = ScopeConfig {
            allowed_domain_suffixes: vec![".Example.EDU".to_string()],
            exceptions: Vec::new(),
            denied_extensions: vec!["txt".to_string()],
            max_path_segments: 2,
            max_numeric_run: 5,
        };
        let filter = ScopeFilter::new(&config);
        assert!(filter.is_in_scope(&Url::parse("https://cs.example.edu/a/b").unwrap()));
        assert!(!filter.is_in_scope(&Url::parse("https://cs.example.edu/a/b/c").unwrap()));
        assert!(!filter.is_in_scope(&Url::parse("https://cs.example.edu/robots.txt").unwrap()));
        assert!(!filter.is_in_scope(&Url::parse("https://www.ics.uci.edu/").unwrap()));
    }
}
