use anyhow::{Context, Result};
use focuscrawl::config::Config;
use std::path::Path;

const HEADER: &str = "# focuscrawl configuration
#
# Scope, trap and stopword lists are tuned for the UCI ICS host family;
# adjust them for other crawl targets.
";

pub fn init_config(path: &Path) -> Result<()> {
    let config_path = path.join("focuscrawl.toml");
    if config_path.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            config_path.display()
        );
    }

    let body = Config::default().to_toml_string()?;
    let content = format!("{}\n{}", HEADER, body);

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
