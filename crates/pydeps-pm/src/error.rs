//! Error types for dependency resolution.

use std::path::PathBuf;

use pydeps_semver::{SpecError, VersionError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("Invalid package key \"{0}\" (required format: \"name-version\")")]
    InvalidPackageKey(String),

    #[error("No package found for {0}")]
    NoPackageMatch(String),

    #[error("Unsupported archive file: {0}")]
    UnsupportedArchive(String),

    #[error("Metadata generation failed for {package}: {reason}")]
    MetadataGenerationFailed { package: String, reason: String },

    #[error("Checksum mismatch for {url}: expected sha256 {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to open archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("Invalid index fixture: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
