//! Transitive dependency walk.
//!
//! The resolver asks a [`PackageIndex`] for the best match of each spec and
//! for that match's dependencies, recording every dependency it meets in
//! depth-first order:
//!
//! 1. Resolve the root spec to a concrete version
//! 2. Fetch its dependency specs, each tagged with the root as `source`
//! 3. Record each dependency, then descend into it before its next sibling
//!
//! Nothing is deduplicated: the same package may appear several times with
//! different predicates or sources. [`merge_specs`] folds the result into
//! one entry per package.
//!
//! A package already being expanded on the current path is recorded again
//! but not descended into, so dependency cycles terminate.
//!
//! # Example
//!
//! ```
//! use pydeps_pm::index::InMemoryIndex;
//! use pydeps_pm::resolver::Resolver;
//! use pydeps_semver::Version;
//!
//! # tokio_test::block_on(async {
//! let index = InMemoryIndex::new([
//!     ("foo-0.1", vec!["bar"]),
//!     ("bar-1.0", vec![]),
//! ])
//! .unwrap();
//!
//! let specs = Resolver::new(&index)
//!     .resolve_package("foo", &Version::parse("0.1").unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(specs[0].to_string(), "bar");
//! # });
//! ```

mod merge;

#[cfg(test)]
mod tests;

pub use merge::{merge_specs, MergedSpec};

use std::collections::HashSet;

use log::{debug, info};
use pydeps_semver::{Spec, Version};

use crate::index::PackageIndex;
use crate::Result;

/// When a concrete package may be expanded again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Revisit {
    /// Expand a package every time it is reached, except when it is already
    /// on the path being expanded
    #[default]
    PerPath,
    /// Expand each concrete package at most once per walk
    Once,
}

#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    pub revisit: Revisit,
}

impl ResolverOptions {
    pub fn revisit(mut self, revisit: Revisit) -> Self {
        self.revisit = revisit;
        self
    }
}

/// A dependency waiting to be recorded and expanded
struct Pending {
    spec: Spec,
    /// `name==version` of every package expanded above this one
    ancestors: Vec<String>,
}

/// Depth-first dependency walker over a [`PackageIndex`]
pub struct Resolver<'a> {
    index: &'a dyn PackageIndex,
    options: ResolverOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a dyn PackageIndex) -> Self {
        Self::with_options(index, ResolverOptions::default())
    }

    pub fn with_options(index: &'a dyn PackageIndex, options: ResolverOptions) -> Self {
        Self { index, options }
    }

    /// Resolve the dependencies of a concrete package
    pub async fn resolve_package(&self, name: &str, version: &Version) -> Result<Vec<Spec>> {
        self.resolve_all(&Spec::pinned(name, version)).await
    }

    /// Resolve the full transitive dependency list of `root`.
    ///
    /// The root itself is not part of the result. Any lookup failure aborts
    /// the walk.
    pub async fn resolve_all(&self, root: &Spec) -> Result<Vec<Spec>> {
        let mut resolved = Vec::new();
        let mut expanded = HashSet::new();
        let mut stack = Vec::new();

        self.expand(root, &[], &mut expanded, &mut stack).await?;
        while let Some(Pending { spec, ancestors }) = stack.pop() {
            self.expand(&spec, &ancestors, &mut expanded, &mut stack)
                .await?;
            resolved.push(spec);
        }

        debug!("Resolved {} dependency specs for {}", resolved.len(), root);
        Ok(resolved)
    }

    /// Resolve `spec` and queue its dependencies, first dependency on top
    async fn expand(
        &self,
        spec: &Spec,
        ancestors: &[String],
        expanded: &mut HashSet<String>,
        stack: &mut Vec<Pending>,
    ) -> Result<()> {
        let version = self.index.find_best_match(spec).await?;
        let node = format!("{}=={}", spec.key(), version);

        if ancestors.contains(&node) {
            debug!("Not expanding {}: cycle via {}", node, ancestors.join(" -> "));
            return Ok(());
        }
        if self.options.revisit == Revisit::Once && !expanded.insert(node.clone()) {
            debug!("Not expanding {}: already expanded", node);
            return Ok(());
        }

        info!(
            "Looking up dependencies for {} (from {})",
            spec,
            spec.source().unwrap_or(spec.name())
        );
        let dependencies = self.index.get_dependencies(spec.name(), &version).await?;

        let mut path = ancestors.to_vec();
        path.push(node);
        for dependency in dependencies.into_iter().rev() {
            stack.push(Pending {
                spec: dependency,
                ancestors: path.clone(),
            });
        }

        Ok(())
    }
}
