//! Clear-cache command - empty the archive store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::HumanBytes;

use pydeps_pm::cache::ArtifactStore;

use crate::config;

#[derive(Args, Debug)]
pub struct ClearCacheArgs {
    /// Directory to clear instead of the configured one
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./pydeps.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: ClearCacheArgs) -> Result<i32> {
    let cache_dir = match args.cache_dir {
        Some(dir) => dir,
        None => config::load(args.config.as_deref())?.cache_dir,
    };

    let store = ArtifactStore::new(cache_dir);
    if !store.root().exists() {
        println!("{} Cache directory does not exist: {}", style("Info:").cyan(), store.root().display());
        return Ok(0);
    }

    let freed = store
        .clear()
        .with_context(|| format!("Failed to clear {}", store.root().display()))?;

    println!(
        "{} Cleared {} ({})",
        style("Success:").green().bold(),
        store.root().display(),
        HumanBytes(freed)
    );

    Ok(0)
}
