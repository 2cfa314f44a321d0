use anyhow::Result;
use focuscrawl::{config::Config, scraping::CrawlCoordinator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct CrawlOverrides {
    pub seeds: Vec<String>,
    pub max_pages: Option<usize>,
    pub concurrency: Option<usize>,
    pub delay_ms: Option<u64>,
    pub output: Option<PathBuf>,
}

impl CrawlOverrides {
    fn apply(self, config: &mut Config) {
        let crawl = &mut config.crawl;
        if !self.seeds.is_empty() {
            crawl.seeds = self.seeds;
        }
        if let Some(max_pages) = self.max_pages {
            crawl.max_pages = max_pages;
        }
        if let Some(concurrency) = self.concurrency {
            crawl.max_concurrent_fetches = concurrency;
        }
        if let Some(delay_ms) = self.delay_ms {
            crawl.politeness_delay_ms = delay_ms;
        }
        if self.output.is_some() {
            crawl.report_path = self.output;
        }
    }
}

pub async fn run_crawl(mut config: Config, overrides: CrawlOverrides) -> Result<()> {
    overrides.apply(&mut config);
    config.validate()?;

    let coordinator = Arc::new(CrawlCoordinator::from_config(&config)?);

    let admitted = coordinator.add_seeds(&config.crawl.seeds).await;
    if admitted == 0 {
        anyhow::bail!("No seed URL passed the scope filter");
    }

    println!("Crawl Configuration:");
    println!("  Seeds: {} of {} admitted", admitted, config.crawl.seeds.len());
    println!("  Concurrency: {}", config.crawl.max_concurrent_fetches);
    println!("  Politeness delay: {} ms", config.crawl.politeness_delay_ms);
    if config.crawl.max_pages > 0 {
        println!("  Max pages: {}", config.crawl.max_pages);
    }
    println!();

    let stopper = Arc::clone(&coordinator);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight pages");
            stopper.stop();
        }
    });

    let started = Instant::now();
    coordinator.run().await;
    signal_task.abort();

    let stats = coordinator.stats().await;
    info!(
        "Crawl finished in {:.1}s: {} fetches, {} failures",
        started.elapsed().as_secs_f64(),
        stats.fetches,
        stats.fetch_failures
    );

    println!("Crawl Summary:");
    println!("  Fetches: {}", stats.fetches);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Pages recorded: {}", stats.pages_recorded);
    println!("  Pages skipped: {}", stats.pages_skipped);
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Links admitted: {}", stats.links_admitted);
    println!("  Still queued: {}", stats.queue_size);
    println!();

    let report = coordinator.core().snapshot();
    println!("{}", report);

    if let Some(path) = &config.crawl.report_path {
        report.save(path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let overrides = CrawlOverrides {
            seeds: vec!["https://www.cs.uci.edu".to_string()],
            max_pages: Some(10),
            concurrency: Some(2),
            delay_ms: None,
            output: Some(PathBuf::from("report.json")),
        };
        overrides.apply(&mut config);

        assert_eq!(config.crawl.seeds, vec!["https://www.cs.uci.edu"]);
        assert_eq!(config.crawl.max_pages, 10);
        assert_eq!(config.crawl.max_concurrent_fetches, 2);
        assert_eq!(config.crawl.politeness_delay_ms, 500);
        assert_eq!(config.crawl.report_path, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn empty_overrides_keep_config() {
        let mut config = Config::default();
        let seeds = config.crawl.seeds.clone();
        CrawlOverrides::default().apply(&mut config);
        assert_eq!(config.crawl.seeds, seeds);
        assert!(config.crawl.report_path.is_none());
    }
}
