//! Resolver configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::metadata::MetadataFailurePolicy;

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple/";

/// Settings shared by every component of a resolution session.
///
/// Every field has a default so a config file only needs to name what it
/// overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Where downloaded archives are kept between runs
    pub cache_dir: PathBuf,
    /// Base URL of a PEP 503 simple repository
    pub index_url: String,
    /// Interpreter used to run `setup.py egg_info`
    pub python: String,
    /// Download timeout in seconds
    pub download_timeout: u64,
    /// Metadata generation timeout in seconds
    pub metadata_timeout: u64,
    /// What to do when metadata generation fails
    pub on_metadata_failure: MetadataFailurePolicy,
    /// Pick the lowest matching version instead of the highest
    pub prefer_lowest: bool,
}

impl Config {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            python: "python3".to_string(),
            download_timeout: 60,
            metadata_timeout: 120,
            on_metadata_failure: MetadataFailurePolicy::default(),
            prefer_lowest: false,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "pydeps") {
        return dirs.cache_dir().join("archives");
    }
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".pydeps").join("cache"))
        .unwrap_or_else(|| PathBuf::from(".pydeps/cache"))
}
