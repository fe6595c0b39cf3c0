use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use log::{debug, info, warn};
use pydeps_semver::{Spec, Version};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use super::PackageIndex;
use crate::archive;
use crate::cache::ArtifactStore;
use crate::metadata::requires::{find_requires_file, read_requirement_lines};
use crate::metadata::{MetadataFailurePolicy, MetadataGenerator, MetadataOutcome};
use crate::policy::Policy;
use crate::repository::{Artifact, Repository};
use crate::{Error, Result};

/// A concrete match: the chosen version and where to download it
#[derive(Debug, Clone)]
struct Located {
    version: Version,
    artifact: Artifact,
}

/// Memoized result of inspecting one archive
#[derive(Debug, Clone, PartialEq, Eq)]
enum CachedDependencies {
    /// Requirement lines read from the metadata listing
    Found(Vec<String>),
    /// Metadata could not be generated or declared no requirements
    NotFound,
}

/// An index backed by a package repository and downloaded source archives.
///
/// Two caches live as long as the index does:
///
/// * the location cache maps a spec's string form to the artifact chosen
///   for it, so repeated lookups do not hit the repository again;
/// * the dependency cache maps a local archive path to what was extracted
///   from it, so each archive is unpacked at most once.
///
/// Archives themselves persist across runs in the [`ArtifactStore`].
pub struct RemoteIndex {
    repository: Arc<dyn Repository>,
    store: ArtifactStore,
    generator: Arc<dyn MetadataGenerator>,
    policy: Policy,
    on_metadata_failure: MetadataFailurePolicy,
    locations: Mutex<HashMap<String, Located>>,
    dependencies: Mutex<HashMap<PathBuf, CachedDependencies>>,
}

impl RemoteIndex {
    pub fn new(
        repository: Arc<dyn Repository>,
        store: ArtifactStore,
        generator: Arc<dyn MetadataGenerator>,
    ) -> Self {
        Self {
            repository,
            store,
            generator,
            policy: Policy::default(),
            on_metadata_failure: MetadataFailurePolicy::default(),
            locations: Mutex::new(HashMap::new()),
            dependencies: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn on_metadata_failure(mut self, policy: MetadataFailurePolicy) -> Self {
        self.on_metadata_failure = policy;
        self
    }

    /// Resolve a spec to a concrete artifact, consulting the location cache
    async fn locate(&self, spec: &Spec) -> Result<Located> {
        let key = spec.to_string();
        let cached = self
            .locations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(located) = cached {
            return Ok(located);
        }

        let candidates: Vec<Located> = self
            .repository
            .find_candidates(spec)
            .await?
            .into_iter()
            .filter_map(|artifact| match artifact.version() {
                Some(version) => Some(Located { version, artifact }),
                None => {
                    warn!("Ignoring {}: no version in file name", artifact.filename);
                    None
                }
            })
            .filter(|candidate| spec.matches(&candidate.version))
            .collect();

        let best = self
            .policy
            .select_best(candidates, |c| &c.version)
            .ok_or_else(|| Error::NoPackageMatch(key.clone()))?;
        debug!("{} resolved to {}", key, best.artifact.filename);

        let mut locations = self.locations.lock().unwrap_or_else(PoisonError::into_inner);
        // The pinned form is what dependency lookups ask for next
        locations.insert(
            Spec::pinned(spec.name(), &best.version).to_string(),
            best.clone(),
        );
        locations.insert(key, best.clone());

        Ok(best)
    }

    /// Return the local path of an artifact, downloading it if needed
    async fn fetch_archive(&self, artifact: &Artifact) -> Result<PathBuf> {
        let url = artifact.url_without_fragment();
        let key = ArtifactStore::key_for(url.as_str());
        if self.store.exists(&key) {
            debug!("Using stored archive {}", artifact.filename);
            return Ok(self.store.path(&key));
        }

        info!("Downloading {}", artifact.filename);
        let data = self.repository.fetch(&url).await?;

        if let Some(expected) = artifact.sha256() {
            let actual = format!("{:x}", Sha256::digest(&data));
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(Error::ChecksumMismatch {
                    url: url.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(self.store.write(&key, &data)?)
    }

    /// Unpack an archive and read its requirement listing.
    ///
    /// The temporary directory is removed when `unpacked` drops, on every
    /// return path.
    async fn extract_dependencies(
        &self,
        archive_path: &Path,
        artifact: &Artifact,
        name: &str,
    ) -> Result<CachedDependencies> {
        let unpacked = TempDir::new()?;
        archive::unpack(archive_path, &artifact.filename, unpacked.path())?;
        let source_dir = source_root(unpacked.path())?;

        match self.generator.generate(&source_dir).await? {
            MetadataOutcome::Generated => {}
            MetadataOutcome::Failed { reason } => match self.on_metadata_failure {
                MetadataFailurePolicy::TreatAsNoDependencies => {
                    debug!(
                        "No metadata for {} ({}), assuming no dependencies",
                        artifact.filename, reason
                    );
                    return Ok(CachedDependencies::NotFound);
                }
                MetadataFailurePolicy::Fail => {
                    return Err(Error::MetadataGenerationFailed {
                        package: artifact.filename.clone(),
                        reason,
                    });
                }
            },
        }

        match find_requires_file(&source_dir, name) {
            Some(listing) => Ok(CachedDependencies::Found(read_requirement_lines(&listing)?)),
            None => {
                debug!("{} declares no requirements", artifact.filename);
                Ok(CachedDependencies::NotFound)
            }
        }
    }
}

/// The directory holding the project: an archive's single top-level
/// directory, or the unpack root when there is none.
fn source_root(unpacked: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(unpacked)?.collect::<std::io::Result<Vec<_>>>()?;
    match entries.as_slice() {
        [only] if only.file_type()?.is_dir() => Ok(only.path()),
        _ => Ok(unpacked.to_path_buf()),
    }
}

#[async_trait]
impl PackageIndex for RemoteIndex {
    async fn find_best_match(&self, spec: &Spec) -> Result<Version> {
        Ok(self.locate(spec).await?.version)
    }

    async fn get_dependencies(&self, name: &str, version: &Version) -> Result<Vec<Spec>> {
        let located = self.locate(&Spec::pinned(name, version)).await?;
        let archive_path = self.fetch_archive(&located.artifact).await?;

        let cached = self
            .dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&archive_path)
            .cloned();
        let extracted = match cached {
            Some(extracted) => extracted,
            None => {
                let extracted = self
                    .extract_dependencies(&archive_path, &located.artifact, name)
                    .await?;
                self.dependencies
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(archive_path, extracted.clone());
                extracted
            }
        };

        match extracted {
            CachedDependencies::Found(lines) => lines
                .iter()
                .map(|line| Spec::parse_line(line, Some(name)).map_err(Error::from))
                .collect(),
            CachedDependencies::NotFound => Ok(Vec::new()),
        }
    }
}
