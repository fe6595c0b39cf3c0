//! Dependency metadata extraction from unpacked source trees.
//!
//! A [`MetadataGenerator`] runs the build tool step that writes
//! `<project>.egg-info/requires.txt`; [`requires`] locates and reads that
//! listing.

mod egg_info;
pub mod requires;

pub use egg_info::EggInfoGenerator;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;

/// Result of running the metadata step in a source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// The step succeeded; a metadata directory should now exist
    Generated,
    /// The step ran but did not succeed
    Failed { reason: String },
}

/// Runs the out-of-tree metadata step for an unpacked source distribution
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    /// Generate metadata inside `source_dir`.
    ///
    /// Failing to *run* the tool is an error; the tool itself reporting
    /// failure is [`MetadataOutcome::Failed`].
    async fn generate(&self, source_dir: &Path) -> Result<MetadataOutcome>;
}

/// What the remote index does with a package whose metadata cannot be
/// generated or read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataFailurePolicy {
    /// Record the package as having no dependencies and carry on
    #[default]
    TreatAsNoDependencies,
    /// Abort resolution with [`crate::Error::MetadataGenerationFailed`]
    Fail,
}
