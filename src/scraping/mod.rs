//! Decision core of the focused crawler
//!
//! Every candidate link found on a fetched page flows through the same
//! pipeline before it may enter the crawl frontier:
//!
//! - `normalize_link`: resolve against the page URL, drop the fragment
//! - `ScopeFilter`: scheme, denied extensions, allowed hosts, path structure
//! - `TrapDetector`: calendar pages, wiki/VCS browsers and other URL-space traps
//! - `UrlDeduplicator`: at-most-once admission into the frontier
//!
//! Page bodies are handled by `extractor` (links + tokens), whose token output
//! feeds `crate::stats::CrawlStatistics`. `CrawlCore` composes all of this
//! behind `filter_links` / `process_page` / `report`.

pub mod coordinator;
pub mod dedup;
pub mod extractor;
pub mod fetcher;
pub mod frontier;
pub mod politeness;
pub mod scope;
pub mod trap_detection;

pub use coordinator::{CrawlCoordinator, CrawlCore};
pub use dedup::UrlDeduplicator;
pub use extractor::{PageContent, SkipReason, StopwordSet};
pub use fetcher::{FetchEngine, FetchResult};
pub use frontier::CrawlQueue;
pub use politeness::PolitenessController;
pub use scope::ScopeFilter;
pub use trap_detection::{TrapDetector, TrapKind};

use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors produced while turning a raw hyperlink into a canonical URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("unparsable link '{raw}': {reason}")]
    Unparsable { raw: String, reason: String },
}

/// Resolve a possibly-relative hyperlink against the page it was found on
/// and return its canonical form.
///
/// The canonical form has no fragment and a lowercase scheme and host; path
/// and query keep their original case. Malformed links are reported as
/// `UrlError::Unparsable` and are expected to be dropped by the caller.
pub fn normalize_link(base: &Url, raw: &str) -> Result<Url, UrlError> {
    let url = base.join(raw.trim()).map_err(|e| UrlError::Unparsable {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(canonicalize(url))
}

/// Parse an absolute URL string into the same canonical form as `normalize_link`
pub fn normalize_absolute(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Unparsable {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(canonicalize(url))
}

fn canonicalize(mut url: Url) -> Url {
    url.set_fragment(None);

    // The parser already lowercases hosts of special schemes (http, https);
    // other schemes keep whatever case they were written in.
    if let Some(host) = url.host_str() {
        if host.chars().any(|c| c.is_ascii_uppercase()) {
            let lowered = host.to_ascii_lowercase();
            let _ = url.set_host(Some(&lowered));
        }
    }

    url
}

/// Why a candidate link was kept out of the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Link could not be resolved to a URL
    Unparsable,
    /// Scheme other than http/https
    UnsupportedScheme,
    /// Path ends in a denied file extension
    DeniedExtension,
    /// Host (and path) outside the configured scope
    OutOfScope,
    /// Path has more segments than allowed
    TooManySegments,
    /// Path has a long run of purely numeric segments
    NumericRun,
    /// Matched a crawl trap signature
    Trap(TrapKind),
    /// Already admitted to the frontier earlier
    AlreadySeen,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparsable => f.write_str("unparsable"),
            Self::UnsupportedScheme => f.write_str("unsupported scheme"),
            Self::DeniedExtension => f.write_str("denied extension"),
            Self::OutOfScope => f.write_str("out of scope"),
            Self::TooManySegments => f.write_str("too many path segments"),
            Self::NumericRun => f.write_str("numeric path run"),
            Self::Trap(kind) => write!(f, "trap ({})", kind),
            Self::AlreadySeen => f.write_str("already seen"),
        }
    }
}
