//! Loading the resolver configuration for a command.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`--config`, else `./pydeps.toml` when present), then the
//! `PYDEPS_CACHE_DIR` and `PYDEPS_INDEX_URL` environment variables.
//! Command line flags are applied on top by each command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use pydeps_pm::Config;

const DEFAULT_CONFIG_FILE: &str = "pydeps.toml";

pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => read_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            read_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::default(),
    };
    Ok(apply_env(config, |key| std::env::var(key).ok()))
}

fn read_file(path: &Path) -> Result<Config> {
    debug!("Reading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn apply_env(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(dir) = lookup("PYDEPS_CACHE_DIR").filter(|v| !v.is_empty()) {
        config.cache_dir = PathBuf::from(dir);
    }
    if let Some(url) = lookup("PYDEPS_INDEX_URL").filter(|v| !v.is_empty()) {
        config.index_url = url;
    }
    config
}
