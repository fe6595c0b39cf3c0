//! Source archive detection and extraction.

use std::fs::File;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use zip::ZipArchive;

use crate::{Error, Result};

/// Extensions made of two dot-separated parts; checked before the last-dot split
const COMPOUND_EXTENSIONS: &[&str] = &[".tar.gz", ".tar.bz2", ".tar.xz"];

/// Archive formats that can be unpacked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    TarGz,
    TarBz2,
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a file name's extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = split_extension(filename);
        match ext.to_ascii_lowercase().as_str() {
            ".tar" => Some(ArchiveFormat::Tar),
            ".tar.gz" | ".tgz" => Some(ArchiveFormat::TarGz),
            ".tar.bz2" | ".tbz" | ".tbz2" => Some(ArchiveFormat::TarBz2),
            ".zip" => Some(ArchiveFormat::Zip),
            _ => None,
        }
    }
}

/// Split a file name into stem and extension, keeping `.tar.*` together.
///
/// `six-1.2.0.tar.gz` splits into (`six-1.2.0`, `.tar.gz`).
pub fn split_extension(filename: &str) -> (&str, &str) {
    let lower = filename.to_ascii_lowercase();
    for ext in COMPOUND_EXTENSIONS {
        if lower.ends_with(ext) {
            return filename.split_at(filename.len() - ext.len());
        }
    }
    match filename.rfind('.') {
        Some(pos) if pos > 0 => filename.split_at(pos),
        _ => (filename, ""),
    }
}

/// Extract `archive` (named `filename`) into `target`.
///
/// The archive handle is closed before returning on every path.
pub fn unpack(archive: &Path, filename: &str, target: &Path) -> Result<()> {
    let format = ArchiveFormat::from_filename(filename)
        .ok_or_else(|| Error::UnsupportedArchive(filename.to_string()))?;
    let file = File::open(archive)?;

    match format {
        ArchiveFormat::Tar => tar::Archive::new(file).unpack(target)?,
        ArchiveFormat::TarGz => tar::Archive::new(GzDecoder::new(file)).unpack(target)?,
        ArchiveFormat::TarBz2 => tar::Archive::new(BzDecoder::new(file)).unpack(target)?,
        ArchiveFormat::Zip => {
            let to_archive_error = |source| Error::Archive {
                path: archive.to_path_buf(),
                source,
            };
            ZipArchive::new(file)
                .map_err(to_archive_error)?
                .extract(target)
                .map_err(to_archive_error)?;
        }
    }

    Ok(())
}
