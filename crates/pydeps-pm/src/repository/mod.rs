//! Package repository clients.
//!
//! A repository turns a [`Spec`] into candidate downloadable artifacts and
//! fetches artifact contents. It is a source of candidates only; choosing
//! among them is the index's job.

mod simple;

pub use simple::SimpleRepository;

use async_trait::async_trait;
use pydeps_semver::{Spec, Version};
use url::Url;

use crate::archive::split_extension;
use crate::Result;

/// A downloadable distribution file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Download URL, possibly carrying a `#sha256=...` fragment
    pub url: Url,
    /// File name, e.g. `six-1.2.0.tar.gz`
    pub filename: String,
}

impl Artifact {
    pub fn new(url: Url, filename: impl Into<String>) -> Self {
        Self {
            url,
            filename: filename.into(),
        }
    }

    /// Build an artifact whose file name is the last path segment of `url`
    pub fn from_url(url: Url) -> Option<Self> {
        let filename = url.path_segments()?.next_back()?.to_string();
        if filename.is_empty() {
            return None;
        }
        Some(Self::new(url, filename))
    }

    /// The URL with any fragment removed; this is what gets downloaded and
    /// what the local cache key is derived from.
    pub fn url_without_fragment(&self) -> Url {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url
    }

    /// The expected sha256 digest advertised in the URL fragment
    pub fn sha256(&self) -> Option<&str> {
        self.url
            .fragment()?
            .split('&')
            .find_map(|part| part.strip_prefix("sha256="))
    }

    /// The `(name, version)` encoded in the file name.
    ///
    /// The archive extension is split off and the remainder is split at the
    /// last hyphen.
    pub fn name_and_version(&self) -> Option<(&str, &str)> {
        let (stem, _) = split_extension(&self.filename);
        stem.rsplit_once('-')
            .filter(|(name, version)| !name.is_empty() && !version.is_empty())
    }

    /// The parsed version encoded in the file name
    pub fn version(&self) -> Option<Version> {
        let (_, version) = self.name_and_version()?;
        Version::parse(version).ok()
    }
}

/// Source of candidate artifacts
#[async_trait]
pub trait Repository: Send + Sync {
    /// Return every artifact that might satisfy `spec`; may be empty
    async fn find_candidates(&self, spec: &Spec) -> Result<Vec<Artifact>>;

    /// Fetch the contents of an artifact
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}
