//! Link and token extraction from fetched pages
//!
//! One parse pass over the document yields both the anchor hrefs (in document
//! order, unresolved) and the visible-text tokens. Tokens are lowercased
//! maximal runs of Unicode word characters with stopwords removed.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use scraper::{Html, Node};
use std::collections::HashSet;
use std::sync::OnceLock;

use super::fetcher::FetchResult;
use crate::config::TokenConfig;

static WORD_RE: OnceLock<Regex> = OnceLock::new();

/// Elements whose text never renders
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Set of tokens excluded from word counts
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(&config.stopwords)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Why a fetched page produced no content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Status other than 200
    Status(u16),
    /// Content type is not an HTML document
    NotHtml(String),
    /// Redirected to a URL outside the crawl scope
    OutOfScope(String),
}

/// Outcome of extracting one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// HTML page parsed; either list may be empty
    Parsed {
        links: Vec<String>,
        tokens: Vec<String>,
    },
    /// Expected, silent skip
    Skipped(SkipReason),
    /// Body could not be decoded as a document
    Unparsable(String),
}

impl PageContent {
    pub fn links(&self) -> &[String] {
        match self {
            Self::Parsed { links, .. } => links,
            _ => &[],
        }
    }

    pub fn tokens(&self) -> &[String] {
        match self {
            Self::Parsed { tokens, .. } => tokens,
            _ => &[],
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed { .. })
    }

    /// Split into (links, tokens); both empty unless parsed
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        match self {
            Self::Parsed { links, tokens } => (links, tokens),
            _ => (Vec::new(), Vec::new()),
        }
    }
}

/// Extract links and tokens from a fetch result
pub fn extract_page(result: &FetchResult, stopwords: &StopwordSet) -> PageContent {
    if !result.is_ok() {
        return PageContent::Skipped(SkipReason::Status(result.status_code));
    }
    if !result.is_html() {
        return PageContent::Skipped(SkipReason::NotHtml(result.content_type.clone()));
    }

    match decode_body(&result.body, &result.content_type) {
        Ok(html) => extract_html(&html, stopwords),
        Err(reason) => PageContent::Unparsable(reason),
    }
}

/// Extract links and tokens from an HTML string
pub fn extract_html(html: &str, stopwords: &StopwordSet) -> PageContent {
    let document = Html::parse_document(html);

    let mut links = Vec::new();
    let mut text = String::new();

    for node in document.root_element().descendants() {
        match node.value() {
            Node::Element(element) if element.name() == "a" => {
                if let Some(href) = element.attr("href") {
                    links.push(href.to_string());
                }
            }
            Node::Text(chunk) => {
                let chunk = chunk.trim();
                if chunk.is_empty() {
                    continue;
                }
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
                });
                if !hidden {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(chunk);
                }
            }
            _ => {}
        }
    }

    PageContent::Parsed {
        links,
        tokens: tokenize(&text, stopwords),
    }
}

/// Lowercase, split into word runs, drop stopwords
pub fn tokenize(text: &str, stopwords: &StopwordSet) -> Vec<String> {
    let word_re = WORD_RE.get_or_init(|| Regex::new(r"\w+").unwrap());
    let lowered = text.to_lowercase();
    word_re
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| !stopwords.contains(w))
        .map(str::to_string)
        .collect()
}

/// `charset` parameter of a Content-Type header, if present
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Decode a body using the declared charset, UTF-8 when absent or unknown
fn decode_body(body: &[u8], content_type: &str) -> Result<String, String> {
    let encoding = charset_label(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, had_errors) = encoding.decode_with_bom_removal(body);
    // NUL bytes in an undecodable body mean a binary payload mislabelled as HTML
    if had_errors && body.contains(&0) {
        return Err(format!("binary body (not valid {})", encoding.name()));
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn stopwords() -> StopwordSet {
        StopwordSet::from_config(&TokenConfig::default())
    }

    fn page(status: u16, content_type: &str, body: &[u8]) -> FetchResult {
        FetchResult::new(
            Url::parse("https://www.ics.uci.edu/page").unwrap(),
            status,
            content_type,
            body.to_vec(),
        )
    }

    #[test]
    fn test_links_in_document_order() {
        let html = r#"
            <a href="/about">About</a>
            <p>text <a href='https://www.cs.uci.edu/x#frag'>CS</a></p>
            <a>no href</a>
            <a href="mailto:someone@uci.edu">mail</a>
        "#;
        let content = extract_html(html, &stopwords());
        assert_eq!(
            content.links(),
            &[
                "/about".to_string(),
                "https://www.cs.uci.edu/x#frag".to_string(),
                "mailto:someone@uci.edu".to_string(),
            ]
        );
    }

    #[test]
    fn test_tokens_lowercased_and_stopwords_removed() {
        let html = "<html><body><h1>The Quick Fox</h1><p>The fox is QUICK.</p></body></html>";
        let content = extract_html(html, &stopwords());
        assert_eq!(content.tokens(), &["quick", "fox", "fox", "quick"]);
    }

    #[test]
    fn test_script_and_style_text_ignored() {
        let html = r#"<html><head><style>body { color: red }</style>
            <script>var hidden = 1;</script></head>
            <body><p>visible words</p><noscript>enable javascript</noscript></body></html>"#;
        let content = extract_html(html, &stopwords());
        assert_eq!(content.tokens(), &["visible", "words"]);
    }

    #[test]
    fn test_unicode_word_runs() {
        let html = "<p>Café déjà-vu naïve_test 2024</p>";
        let content = extract_html(html, &StopwordSet::default());
        assert_eq!(content.tokens(), &["café", "déjà", "vu", "naïve_test", "2024"]);
    }

    #[test]
    fn test_adjacent_text_nodes_do_not_merge() {
        let html = "<p><b>alpha</b><i>beta</i></p>";
        let content = extract_html(html, &StopwordSet::default());
        assert_eq!(content.tokens(), &["alpha", "beta"]);
    }

    #[test]
    fn test_non_200_is_skipped() {
        let content = extract_page(&page(404, "text/html", b"<a href='/x'>x</a>"), &stopwords());
        assert_eq!(content, PageContent::Skipped(SkipReason::Status(404)));
        assert!(content.links().is_empty());
        assert!(content.tokens().is_empty());
    }

    #[test]
    fn test_non_html_is_skipped() {
        let content = extract_page(&page(200, "application/pdf", b"%PDF-1.4"), &stopwords());
        assert!(matches!(content, PageContent::Skipped(SkipReason::NotHtml(_))));
    }

    #[test]
    fn test_binary_body_is_unparsable() {
        let body = [0xff, 0x00, 0xfe, 0x00];
        let content = extract_page(&page(200, "text/html", &body), &stopwords());
        assert!(matches!(content, PageContent::Unparsable(_)));
        let (links, tokens) = content.into_parts();
        assert!(links.is_empty() && tokens.is_empty());
    }

    #[test]
    fn test_declared_charset_is_honoured() {
        let body = b"<p>caf\xe9 r\xe9sum\xe9</p>";
        let content = extract_page(
            &page(200, "text/html; charset=ISO-8859-1", body),
            &stopwords(),
        );
        assert_eq!(content.tokens(), &["café", "résumé"]);

        let quoted = extract_page(
            &page(200, "text/html; Charset=\"windows-1252\"", b"<p>na\xefve</p>"),
            &stopwords(),
        );
        assert_eq!(quoted.tokens(), &["naïve"]);
    }

    #[test]
    fn test_undeclared_charset_falls_back_to_utf8() {
        let content = extract_page(
            &page(200, "text/html; charset=no-such-charset", "<p>café</p>".as_bytes()),
            &stopwords(),
        );
        assert_eq!(content.tokens(), &["café"]);

        // invalid UTF-8 without NUL bytes is still parsed, with replacement
        let lossy = extract_page(&page(200, "text/html", b"<p>caf\xe9 menu</p>"), &stopwords());
        assert!(lossy.tokens().contains(&"menu".to_string()));
    }

    #[test]
    fn test_charset_label_parsing() {
        assert_eq!(charset_label("text/html; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_label("text/html;CHARSET=\"Shift_JIS\""), Some("Shift_JIS"));
        assert_eq!(charset_label("text/html"), None);
        assert_eq!(charset_label("charset=utf-8"), None);
    }

    #[test]
    fn test_empty_page_is_parsed_not_unparsable() {
        let content = extract_page(&page(200, "text/html", b""), &stopwords());
        assert_eq!(
            content,
            PageContent::Parsed {
                links: Vec::new(),
                tokens: Vec::new()
            }
        );
    }

    #[test]
    fn test_stopword_set_normalizes_entries() {
        let set = StopwordSet::new([" The ", "", "AND"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("the"));
        assert!(set.contains("and"));
        assert!(!set.is_empty());
    }
}
