//! Local store for downloaded archives.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem store for downloaded package archives.
///
/// Each archive lives in a single file directly under the root, named after
/// the percent-encoded URL it was downloaded from, e.g.
/// `https%3A%2F%2Ffiles.pythonhosted.org%2F...%2Fsix-1.2.0.tar.gz`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Root directory of the store
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a new store instance
    ///
    /// # Arguments
    /// * `root` - Root directory for archive storage
    ///
    /// # Example
    /// ```no_run
    /// use std::path::PathBuf;
    /// use pydeps_pm::cache::ArtifactStore;
    ///
    /// let store = ArtifactStore::new(PathBuf::from("/tmp/pydeps-cache"));
    /// ```
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive the cache key for a download URL
    ///
    /// The encoding is reversible, so distinct URLs never share a key.
    pub fn key_for(url: &str) -> String {
        urlencoding::encode(url).into_owned()
    }

    /// Get the full path for a cache key
    ///
    /// This does not require the file to exist, so it also serves as the
    /// destination path for a download.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Check if an archive exists in the store
    pub fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    /// Write an archive to the store, replacing any existing entry
    ///
    /// Uses atomic write (write to temp file, then rename) so a reader never
    /// sees a partially written archive.
    pub fn write(&self, key: &str, data: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.root)?;

        let path = self.path(key);
        let temp_path = self.root.join(format!("{}.part", key));
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
        }

        // Rename to final location (atomic on most filesystems)
        fs::rename(&temp_path, &path)?;

        Ok(path)
    }

    /// Delete an archive from the store
    pub fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Clear the entire store
    ///
    /// Removes all files and directories under the root and returns the
    /// number of bytes freed.
    pub fn clear(&self) -> io::Result<u64> {
        if !self.root.exists() {
            return Ok(0);
        }

        let freed = self.size()?;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }

        Ok(freed)
    }

    /// Get the total size of the store in bytes
    pub fn size(&self) -> io::Result<u64> {
        let mut total = 0u64;

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total += metadata.len();
                }
            }
        }

        Ok(total)
    }
}
