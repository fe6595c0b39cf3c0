//! Locating and reading `requires.txt` dependency listings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pydeps_semver::normalize_name;
use walkdir::WalkDir;

/// Find `<name>.egg-info/requires.txt` at most one directory below
/// `source_dir`.
///
/// A matching metadata directory without a listing is skipped, so the
/// walk keeps looking for one that has it.
///
/// The metadata directory is matched on the normalized project name, so
/// `zope.interface.egg-info` and `python_dateutil.egg-info` are found for
/// `zope-interface` and `python-dateutil`.
pub fn find_requires_file(source_dir: &Path, name: &str) -> Option<PathBuf> {
    let project = normalize_name(name);

    WalkDir::new(source_dir)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|dir| dir.strip_suffix(".egg-info"))
                .map(|stem| normalize_name(stem) == project)
                .unwrap_or(false)
        })
        .map(|entry| entry.path().join("requires.txt"))
        .find(|path| path.is_file())
}

/// Read the unconditional requirement lines of a `requires.txt` file
pub fn read_requirement_lines(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_requirement_lines(&contents))
}

/// Collect requirement lines up to the first blank line or section header.
///
/// Sections (`[extra]`, `[:python_version < "3"]`) hold conditional
/// requirements and are not part of the base dependency set.
pub fn parse_requirement_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('[') {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        lines.push(line.to_string());
    }

    lines
}
