//! Crawl statistics aggregation and reporting
//!
//! `CrawlStatistics` folds one `PageRecord` per successfully fetched page into
//! process-wide counters. All state sits behind a single mutex, so a record
//! (first-seen check, longest-page comparison, frequency merge) is one
//! critical section and a report never observes a half-applied page.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use url::Url;

/// Result of visiting one in-scope HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Canonical URL of the page
    pub url: Url,
    /// Lowercased host the page was served from
    pub subdomain: String,
    /// Number of tokens after stopword removal
    pub token_count: usize,
    /// The tokens themselves, in page order
    pub tokens: Vec<String>,
}

impl PageRecord {
    pub fn new(url: Url, tokens: Vec<String>) -> Self {
        let subdomain = url.host_str().unwrap_or_default().to_ascii_lowercase();
        Self {
            url,
            subdomain,
            token_count: tokens.len(),
            tokens,
        }
    }
}

/// The page with the most tokens seen so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestPage {
    pub url: String,
    pub token_count: usize,
}

/// One row of the word-frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: u64,
}

/// Pages recorded for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubdomainCount {
    pub host: String,
    pub pages: usize,
}

/// Point-in-time view of the statistics
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub unique_pages: usize,
    pub longest_page: Option<LongestPage>,
    /// Most frequent words, highest count first; ties in first-seen order
    pub top_words: Vec<WordFrequency>,
    /// Every observed host, most pages first; ties by host name
    pub subdomains: Vec<SubdomainCount>,
}

impl Report {
    /// Write the report to `path`: JSON when the path ends in `.json`,
    /// otherwise the text rendering.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = if crate::util::is_json_path(path) {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_string()
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            anyhow::anyhow!("Failed to write report '{}': {}", path.display(), e)
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Crawl Report")?;
        writeln!(f, "============")?;
        writeln!(f, "Generated at: {}", self.generated_at.to_rfc3339())?;
        writeln!(f, "Unique pages: {}", self.unique_pages)?;
        match &self.longest_page {
            Some(page) => writeln!(f, "Longest page: {} ({} words)", page.url, page.token_count)?,
            None => writeln!(f, "Longest page: none")?,
        }

        writeln!(f)?;
        writeln!(f, "Top {} words:", self.top_words.len())?;
        for (rank, entry) in self.top_words.iter().enumerate() {
            writeln!(f, "{:>4}. {:<24} {}", rank + 1, entry.word, entry.count)?;
        }

        writeln!(f)?;
        writeln!(f, "Subdomains ({}):", self.subdomains.len())?;
        for entry in &self.subdomains {
            writeln!(f, "  {}, {}", entry.host, entry.pages)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct WordCount {
    count: u64,
    /// Order in which the word was first recorded
    first_seen: usize,
}

#[derive(Debug, Default)]
struct StatsState {
    pages: HashSet<String>,
    longest: Option<LongestPage>,
    words: HashMap<String, WordCount>,
    subdomains: HashMap<String, usize>,
}

/// Process-wide crawl statistics
#[derive(Debug)]
pub struct CrawlStatistics {
    state: Mutex<StatsState>,
    top_words: usize,
}

impl CrawlStatistics {
    /// Create empty statistics reporting the `top_words` most frequent words
    pub fn new(top_words: usize) -> Self {
        Self {
            state: Mutex::new(StatsState::default()),
            top_words,
        }
    }

    /// Fold a page into the statistics.
    ///
    /// Returns `false` and changes nothing if the page's URL was already
    /// recorded (first-seen wins).
    pub fn record(&self, record: PageRecord) -> bool {
        let mut state = self.state.lock();

        if !state.pages.insert(record.url.as_str().to_string()) {
            return false;
        }

        let is_longer = state
            .longest
            .as_ref()
            .map_or(true, |current| record.token_count > current.token_count);
        if is_longer {
            state.longest = Some(LongestPage {
                url: record.url.to_string(),
                token_count: record.token_count,
            });
        }

        for token in record.tokens {
            let next_rank = state.words.len();
            state
                .words
                .entry(token)
                .or_insert(WordCount {
                    count: 0,
                    first_seen: next_rank,
                })
                .count += 1;
        }

        *state.subdomains.entry(record.subdomain).or_insert(0) += 1;
        true
    }

    /// Number of distinct pages recorded
    pub fn unique_pages(&self) -> usize {
        self.state.lock().pages.len()
    }

    /// Count for one word, zero if never seen
    pub fn word_count(&self, word: &str) -> u64 {
        self.state.lock().words.get(word).map_or(0, |w| w.count)
    }

    /// Page with the most tokens
    pub fn longest_page(&self) -> Option<LongestPage> {
        self.state.lock().longest.clone()
    }

    /// Take a consistent snapshot of the current statistics
    pub fn snapshot(&self) -> Report {
        let state = self.state.lock();

        let mut words: Vec<(&String, &WordCount)> = state.words.iter().collect();
        words.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then_with(|| a.1.first_seen.cmp(&b.1.first_seen))
        });
        let top_words = words
            .into_iter()
            .take(self.top_words)
            .map(|(word, wc)| WordFrequency {
                word: word.clone(),
                count: wc.count,
            })
            .collect();

        let mut subdomains: Vec<SubdomainCount> = state
            .subdomains
            .iter()
            .map(|(host, pages)| SubdomainCount {
                host: host.clone(),
                pages: *pages,
            })
            .collect();
        subdomains.sort_by(|a, b| b.pages.cmp(&a.pages).then_with(|| a.host.cmp(&b.host)));

        Report {
            generated_at: Utc::now(),
            unique_pages: state.pages.len(),
            longest_page: state.longest.clone(),
            top_words,
            subdomains,
        }
    }

    /// Render the human-readable report
    pub fn render(&self) -> String {
        self.snapshot().to_string()
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn page(url: &str, words: &[&str]) -> PageRecord {
        PageRecord::new(
            Url::parse(url).unwrap(),
            words.iter().map(|w| w.to_string()).collect(),
        )
    }

    #[test]
    fn test_record_counts_unique_pages() {
        let stats = CrawlStatistics::default();
        assert!(stats.record(page("https://www.ics.uci.edu/a", &["alpha"])));
        assert!(stats.record(page("https://www.ics.uci.edu/b", &["beta"])));
        assert!(!stats.record(page("https://www.ics.uci.edu/a", &["alpha", "alpha"])));

        assert_eq!(stats.unique_pages(), 2);
        // The duplicate record must not touch word counts
        assert_eq!(stats.word_count("alpha"), 1);
    }

    #[test]
    fn test_longest_page_ties_keep_first() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://www.ics.uci.edu/first", &["a", "b"]));
        stats.record(page("https://www.ics.uci.edu/second", &["c", "d"]));
        stats.record(page("https://www.ics.uci.edu/short", &["e"]));

        let longest = stats.longest_page().unwrap();
        assert_eq!(longest.url, "https://www.ics.uci.edu/first");
        assert_eq!(longest.token_count, 2);
    }

    #[test]
    fn test_empty_page_becomes_longest_when_first() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://www.ics.uci.edu/empty", &[]));
        assert_eq!(stats.longest_page().unwrap().token_count, 0);
        stats.record(page("https://www.ics.uci.edu/full", &["x"]));
        assert_eq!(stats.longest_page().unwrap().url, "https://www.ics.uci.edu/full");
    }

    #[test]
    fn test_subdomains_counted_per_page() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://vision.ics.uci.edu/a", &[]));
        stats.record(page("https://vision.ics.uci.edu/b", &[]));
        stats.record(page("https://www.stat.uci.edu/c", &[]));
        stats.record(page("https://ngs.ics.uci.edu/d", &[]));

        let report = stats.snapshot();
        assert_eq!(
            report.subdomains,
            vec![
                SubdomainCount { host: "vision.ics.uci.edu".to_string(), pages: 2 },
                SubdomainCount { host: "ngs.ics.uci.edu".to_string(), pages: 1 },
                SubdomainCount { host: "www.stat.uci.edu".to_string(), pages: 1 },
            ]
        );
    }

    #[test]
    fn test_top_words_ordered_by_count_then_first_seen() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://www.ics.uci.edu/1", &["zeta", "alpha", "alpha", "mid"]));
        stats.record(page("https://www.ics.uci.edu/2", &["mid", "zeta", "omega"]));

        let words: Vec<(String, u64)> = stats
            .snapshot()
            .top_words
            .into_iter()
            .map(|w| (w.word, w.count))
            .collect();
        assert_eq!(
            words,
            vec![
                ("zeta".to_string(), 2),
                ("alpha".to_string(), 2),
                ("mid".to_string(), 2),
                ("omega".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_words_limited() {
        let stats = CrawlStatistics::new(50);
        let words: Vec<String> = (0..120).map(|i| format!("w{}", i)).collect();
        let refs: Vec<&str> = words.iter().map(|s| s.as_str()).collect();
        stats.record(page("https://www.ics.uci.edu/many", &refs));

        let report = stats.snapshot();
        assert_eq!(report.top_words.len(), 50);
        assert!(report
            .top_words
            .windows(2)
            .all(|pair| pair[0].count >= pair[1].count));
    }

    #[test]
    fn test_render_contains_sections() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://www.ics.uci.edu/research", &["machine", "learning", "machine"]));

        let text = stats.render();
        assert!(text.contains("Unique pages: 1"));
        assert!(text.contains("Longest page: https://www.ics.uci.edu/research (3 words)"));
        assert!(text.contains("machine"));
        assert!(text.contains("www.ics.uci.edu, 1"));
    }

    #[test]
    fn test_render_empty_statistics() {
        let text = CrawlStatistics::default().render();
        assert!(text.contains("Unique pages: 0"));
        assert!(text.contains("Longest page: none"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://www.ics.uci.edu/a", &["word"]));
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["unique_pages"], 1);
        assert_eq!(json["top_words"][0]["word"], "word");
        assert_eq!(json["subdomains"][0]["host"], "www.ics.uci.edu");
    }

    #[test]
    fn test_concurrent_records_keep_maximum() {
        for _ in 0..20 {
            let stats = Arc::new(CrawlStatistics::default());
            let long: Vec<String> = (0..500).map(|i| format!("t{}", i % 7)).collect();
            let short: Vec<String> = (0..300).map(|i| format!("t{}", i % 5)).collect();

            let a = {
                let stats = Arc::clone(&stats);
                let url = Url::parse("https://www.ics.uci.edu/long").unwrap();
                std::thread::spawn(move || stats.record(PageRecord::new(url, long)))
            };
            let b = {
                let stats = Arc::clone(&stats);
                let url = Url::parse("https://www.ics.uci.edu/short").unwrap();
                std::thread::spawn(move || stats.record(PageRecord::new(url, short)))
            };
            assert!(a.join().unwrap());
            assert!(b.join().unwrap());

            assert_eq!(stats.longest_page().unwrap().token_count, 500);
            assert_eq!(stats.unique_pages(), 2);
        }
    }

    #[test]
    fn test_save_text_and_json() {
        let stats = CrawlStatistics::default();
        stats.record(page("https://www.ics.uci.edu/a", &["graphics", "graphics"]));
        let report = stats.snapshot();

        let tmp = tempfile::tempdir().unwrap();
        let text_path = tmp.path().join("report.txt");
        let json_path = tmp.path().join("nested").join("report.json");

        report.save(&text_path).unwrap();
        report.save(&json_path).unwrap();

        let text = std::fs::read_to_string(&text_path).unwrap();
        assert!(text.contains("Unique pages: 1"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["unique_pages"], 1);
        assert_eq!(json["top_words"][0]["word"], "graphics");
        assert_eq!(json["top_words"][0]["count"], 2);
        assert_eq!(json["subdomains"][0]["host"], "www.ics.uci.edu");
    }
}
