//! Candidate link filtering: normalize, scope, traps, then admission

use url::Url;

use crate::scraping::{
    dedup::UrlDeduplicator, normalize_link, scope::ScopeFilter, trap_detection::TrapDetector,
    RejectReason,
};

/// Scope and trap checks on a canonical URL; does not touch the frontier
pub(super) fn classify(
    url: &Url,
    scope: &ScopeFilter,
    traps: &TrapDetector,
) -> Result<(), RejectReason> {
    scope.check(url)?;
    if let Some(kind) = traps.detect(url) {
        return Err(RejectReason::Trap(kind));
    }
    Ok(())
}

/// Full pipeline for one raw link. The deduplicator is consulted exactly
/// once, and only after every other check passed.
pub(super) fn evaluate_link(
    base: &Url,
    raw: &str,
    scope: &ScopeFilter,
    traps: &TrapDetector,
    dedup: &UrlDeduplicator,
) -> Result<Url, RejectReason> {
    let url = normalize_link(base, raw).map_err(|e| {
        tracing::trace!("Dropping link: {}", e);
        RejectReason::Unparsable
    })?;

    classify(&url, scope, traps)?;

    if dedup.admit(&url) {
        Ok(url)
    } else {
        Err(RejectReason::AlreadySeen)
    }
}

/// Filter a page's raw links, returning newly admitted URLs in first-seen order
pub(super) fn filter_links<S: AsRef<str>>(
    base: &Url,
    raw_links: &[S],
    scope: &ScopeFilter,
    traps: &TrapDetector,
    dedup: &UrlDeduplicator,
) -> Vec<Url> {
    raw_links
        .iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            match evaluate_link(base, raw, scope, traps, dedup) {
                Ok(url) => Some(url),
                Err(reason) => {
                    tracing::trace!("Rejected {} on {}: {}", raw, base, reason);
                    None
                }
            }
        })
        .collect()
}
