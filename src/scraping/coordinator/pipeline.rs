//! Page processing pipeline: extraction and conversion to a `PageRecord`

use url::Url;

use crate::scraping::{
    extractor::{extract_page, PageContent, StopwordSet},
    fetcher::FetchResult,
    normalize_absolute,
};
use crate::stats::PageRecord;

/// Canonical identity of the page a response came from (post-redirect)
pub(super) fn page_url(result: &FetchResult) -> Url {
    normalize_absolute(result.final_url.as_str()).unwrap_or_else(|_| {
        let mut url = result.final_url.clone();
        url.set_fragment(None);
        url
    })
}

/// Extract a response and build its record when it produced content
pub(super) fn extract(
    result: &FetchResult,
    stopwords: &StopwordSet,
) -> (PageContent, Option<PageRecord>) {
    let content = extract_page(result, stopwords);
    let record = match &content {
        PageContent::Parsed { tokens, .. } => {
            Some(PageRecord::new(page_url(result), tokens.clone()))
        }
        PageContent::Skipped(reason) => {
            tracing::trace!("Skipping {}: {:?}", result.final_url, reason);
            None
        }
        PageContent::Unparsable(reason) => {
            tracing::debug!("Unparsable page {}: {}", result.final_url, reason);
            None
        }
    };
    (content, record)
}
