//! Configuration for focuscrawl
//!
//! Every filtering heuristic (allowed hosts, denied extensions, trap
//! signatures, stopwords) is configuration data so one binary can be pointed
//! at a different crawl target without recompiling.

mod crawl;
mod logging;
mod scope;
mod tokens;
mod traps;

pub use crawl::CrawlConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scope::{ScopeConfig, ScopeException};
pub use tokens::TokenConfig;
pub use traps::TrapConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default user agent for all HTTP requests
pub const DEFAULT_USER_AGENT: &str = "focuscrawl/0.1 (academic focused crawler)";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fetch loop settings
    #[serde(default)]
    pub crawl: CrawlConfig,
    /// Host/path scope and structural guards
    #[serde(default)]
    pub scope: ScopeConfig,
    /// Crawl trap signatures
    #[serde(default)]
    pub traps: TrapConfig,
    /// Tokenization and report settings
    #[serde(default)]
    pub tokens: TokenConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render this configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        self.crawl.collect_errors(&mut errors);
        self.scope.collect_errors(&mut errors);
        self.traps.collect_errors(&mut errors);
        self.tokens.collect_errors(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
