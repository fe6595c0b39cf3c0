use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::trace;
use pydeps_semver::{normalize_name, Spec, Version};

use super::PackageIndex;
use crate::policy::Policy;
use crate::{Error, Result};

/// Split a `name-version` package key at its last hyphen.
///
/// Names may themselves contain hyphens (`python-dateutil-2.1`); versions
/// never do.
pub fn parse_package_key(key: &str) -> Result<(String, Version)> {
    let invalid = || Error::InvalidPackageKey(key.to_string());

    let (name, version) = key.rsplit_once('-').ok_or_else(invalid)?;
    if name.is_empty() || version.is_empty() {
        return Err(invalid());
    }
    let version = Version::parse(version).map_err(|_| invalid())?;

    Ok((name.to_string(), version))
}

/// An index over a fixed table of packages.
///
/// Built from `name-version` keys mapped to requirement lines:
///
/// ```
/// use pydeps_pm::index::InMemoryIndex;
///
/// let index = InMemoryIndex::new([
///     ("foo-0.1", vec!["bar"]),
///     ("bar-1.2", vec![]),
/// ])
/// .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    /// Known versions per normalized name
    versions_by_name: HashMap<String, Vec<Version>>,

    /// Parsed dependency lists per (normalized name, version)
    dependencies: HashMap<(String, Version), Vec<Spec>>,

    policy: Policy,
}

impl InMemoryIndex {
    /// Build an index, validating every key and requirement line up front
    pub fn new<I, K, L, S>(packages: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();

        for (key, lines) in packages {
            let (name, version) = parse_package_key(key.as_ref())?;
            let deps = lines
                .into_iter()
                .map(|line| Spec::parse_line(line.as_ref(), Some(&name)))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let normalized = normalize_name(&name);
            let versions = index.versions_by_name.entry(normalized.clone()).or_default();
            if !versions.contains(&version) {
                versions.push(version.clone());
            }
            index.dependencies.insert((normalized, version), deps);
        }

        Ok(index)
    }

    /// Build an index from a JSON object of `"name-version": [lines]`
    pub fn from_json(json: &str) -> Result<Self> {
        let table: IndexMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::new(table)
    }

    /// Read a JSON fixture file, see [`InMemoryIndex::from_json`]
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of distinct (name, version) entries
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// All known versions of a package, in table order
    pub fn versions(&self, name: &str) -> &[Version] {
        self.versions_by_name
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl PackageIndex for InMemoryIndex {
    async fn find_best_match(&self, spec: &Spec) -> Result<Version> {
        let candidates: Vec<&Version> = self
            .versions(spec.name())
            .iter()
            .filter(|version| spec.matches(version))
            .collect();
        trace!("{} candidates for {}", candidates.len(), spec);

        self.policy
            .select_best(candidates, |v| *v)
            .cloned()
            .ok_or_else(|| Error::NoPackageMatch(spec.to_string()))
    }

    async fn get_dependencies(&self, name: &str, version: &Version) -> Result<Vec<Spec>> {
        self.dependencies
            .get(&(normalize_name(name), version.clone()))
            .cloned()
            .ok_or_else(|| Error::NoPackageMatch(format!("{}=={}", name, version)))
    }
}
