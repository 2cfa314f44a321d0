use anyhow::Result;
use focuscrawl::{
    config::Config,
    scraping::{normalize_absolute, normalize_link, CrawlCore},
    util::truncate_for_display,
};

const URL_WIDTH: usize = 64;

/// Print the filter verdict for each URL without admitting anything
pub fn check_urls(config: &Config, urls: &[String], base: Option<&str>) -> Result<()> {
    let core = CrawlCore::new(config)?;
    let base = base.map(normalize_absolute).transpose()?;

    println!("{:<8} {:<width$} REASON", "VERDICT", "URL", width = URL_WIDTH);
    for raw in urls {
        let resolved = match &base {
            Some(base) => normalize_link(base, raw),
            None => normalize_absolute(raw),
        };

        let (shown, verdict) = match resolved {
            Ok(url) => {
                let verdict = core.classify(&url).map_err(|reason| reason.to_string());
                (url.to_string(), verdict)
            }
            Err(e) => (raw.clone(), Err(e.to_string())),
        };

        let shown = truncate_for_display(&shown, URL_WIDTH);
        match verdict {
            Ok(()) => println!("{:<8} {}", "accept", shown),
            Err(reason) => println!(
                "{:<8} {:<width$} {}",
                "reject",
                shown,
                reason,
                width = URL_WIDTH
            ),
        }
    }

    Ok(())
}
