//! Application configuration.
//!
//! Settings live in `config.toml` under the user configuration directory and
//! can be overridden through `CORKBOARD_*` environment variables.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::CatalogSource;

const DEFAULT_CONFIG: &str = r#"# Corkboard configuration.

# Path to a JSON catalog file overriding the built-in listing table.
# The file maps category keys (services, housing, jobs, community,
# personals, forums, gigs) to arrays of listings and is reloaded
# automatically while the app runs.
# catalog_path = "/path/to/catalog.json"

# Show the block-letter masthead on the home screen.
show_banner = true
"#;

/// Runtime configuration for the terminal app.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Optional JSON catalog file overriding the built-in table.
    pub catalog_path: Option<PathBuf>,
    /// Whether the home screen shows the block-letter masthead.
    pub show_banner: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            show_banner: true,
        }
    }
}

/// Directory holding the user configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("corkboard")
}

/// Path to `config.toml`.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Write a commented default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = config_file();
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(config_dir()).context("failed to create config directory")?;
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

impl AppConfig {
    /// Load configuration, layering the config file under `CORKBOARD_*`
    /// environment variables. Missing keys fall back to defaults.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(config_file()).required(false))
            .add_source(config::Environment::with_prefix("CORKBOARD"))
            .build()
            .context("failed to assemble configuration")?;
        settings
            .try_deserialize::<AppConfig>()
            .context("failed to deserialize configuration")
    }

    /// The catalog source implied by this configuration.
    pub fn catalog_source(&self) -> CatalogSource {
        match &self.catalog_path {
            Some(path) => CatalogSource::File(path.clone()),
            None => CatalogSource::Builtin,
        }
    }
}
