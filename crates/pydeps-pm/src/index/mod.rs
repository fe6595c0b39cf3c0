//! Package indexes: where versions and dependency lists come from.
//!
//! The resolver only ever talks to a [`PackageIndex`]. Two implementations
//! exist: [`InMemoryIndex`] for fixed package tables and [`RemoteIndex`],
//! which downloads and inspects source archives.

mod memory;
mod remote;

pub use memory::{parse_package_key, InMemoryIndex};
pub use remote::RemoteIndex;

use async_trait::async_trait;
use pydeps_semver::{Spec, Version};

use crate::Result;

/// Capability shared by every package index
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Return the preferred version of `spec.name()` satisfying every
    /// predicate of `spec`, or [`crate::Error::NoPackageMatch`].
    async fn find_best_match(&self, spec: &Spec) -> Result<Version>;

    /// Return the direct dependencies of `name` at `version`, each tagged
    /// with `name` as its source.
    async fn get_dependencies(&self, name: &str, version: &Version) -> Result<Vec<Spec>>;
}
