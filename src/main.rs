//! focuscrawl: focused web crawler for academic host families

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use focuscrawl::config::{Config, LogFormat};
use std::path::PathBuf;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "focuscrawl")]
#[command(about = "Focused crawler with scope filtering, trap detection and crawl statistics")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "focuscrawl.toml")]
    config: PathBuf,

    /// Verbosity level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl from seed URLs and print the report
    Crawl {
        /// Seed URLs (defaults to the seeds in the config file)
        seeds: Vec<String>,

        /// Maximum pages to fetch (0 = until the frontier is exhausted)
        #[arg(short, long)]
        max_pages: Option<usize>,

        /// Maximum concurrent fetches
        #[arg(long)]
        concurrency: Option<usize>,

        /// Delay between requests to the same host in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Write the report to this file (JSON if it ends in .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how the filter pipeline judges URLs
    Check {
        /// URLs (absolute, or relative to --base)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Base URL to resolve relative links against
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let level: tracing::Level = config.logging.level.more_verbose(verbose).into();

    match config.logging.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init runs before any config is loaded
    if let Commands::Init { path } = &cli.command {
        return commands::init::init_config(path);
    }

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    init_logging(&config, cli.verbose)?;

    if cli.config.exists() {
        tracing::debug!("Loaded configuration from {}", cli.config.display());
    }

    match cli.command {
        Commands::Crawl {
            seeds,
            max_pages,
            concurrency,
            delay_ms,
            output,
        } => {
            let overrides = commands::crawl::CrawlOverrides {
                seeds,
                max_pages,
                concurrency,
                delay_ms,
                output,
            };
            commands::crawl::run_crawl(config, overrides).await
        }
        Commands::Check { urls, base } => {
            commands::check::check_urls(&config, &urls, base.as_deref())
        }
        Commands::Init { .. } => Ok(()),
    }
}
