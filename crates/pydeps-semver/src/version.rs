//! Normalized, totally ordered Python package versions.
//!
//! Parsing accepts the PEP 386 / PEP 440 public version grammar: a numeric
//! release, an optional pre-release (`a`, `b`, `rc` and their spellings),
//! an optional post-release and an optional dev marker. Two strings that
//! normalize to the same components compare equal, so `1.0`, `1.0.0` and
//! `v1.0` are the same version.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref VERSION_REGEX: Regex = Regex::new(
        r"(?ix)
        ^\s*v?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|rc|c)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:
            (?:[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n>[0-9]+)?)
            |
            (?:-(?P<post_implicit>[0-9]+))
        )?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        \s*$"
    )
    .unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version \"{0}\"")]
    InvalidVersion(String),
}

/// Pre-release phase, ordered `a < b < rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::Rc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::Rc => "rc",
        }
    }
}

/// Where a version sits relative to its final release.
///
/// Variant order is significant: a dev build of a release sorts below all of
/// its pre-releases, which sort below the final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum PhaseKey {
    DevOfRelease,
    Pre(PreRelease, u64),
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum DevKey {
    Dev(u64),
    None,
}

/// A parsed package version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
}

impl Version {
    /// Parse and normalize a version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion(input.to_string());
        let caps = VERSION_REGEX.captures(input).ok_or_else(invalid)?;

        let release = caps["release"]
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let number = |name: &str| -> Result<u64, VersionError> {
            match caps.name(name) {
                Some(m) => m.as_str().parse().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        let pre = match caps.name("pre_l") {
            Some(label) => Some((PreRelease::from_label(label.as_str()), number("pre_n")?)),
            None => None,
        };

        let post = if caps.name("post_l").is_some() {
            Some(number("post_n")?)
        } else if caps.name("post_implicit").is_some() {
            Some(number("post_implicit")?)
        } else {
            None
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(number("dev_n")?),
            None => None,
        };

        Ok(Version {
            raw: input.trim().to_string(),
            release,
            pre,
            post,
            dev,
        })
    }

    /// The text this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Release segments as written (trailing zeros kept)
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<(PreRelease, u64)> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// True for dev builds and pre-releases
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segments with insignificant trailing zeros removed
    fn significant_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|&segment| segment != 0)
            .map_or(0, |pos| pos + 1);
        &self.release[..len]
    }

    fn phase_key(&self) -> PhaseKey {
        match (self.pre, self.post, self.dev) {
            (Some((phase, n)), _, _) => PhaseKey::Pre(phase, n),
            (None, None, Some(_)) => PhaseKey::DevOfRelease,
            _ => PhaseKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        self.dev.map_or(DevKey::None, DevKey::Dev)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant_release()
            .cmp(other.significant_release())
            .then_with(|| self.phase_key().cmp(&other.phase_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_release().hash(state);
        self.phase_key().hash(state);
        self.post.hash(state);
        self.dev_key().hash(state);
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

/// Canonical normalized form, e.g. `1.0rc1.post2.dev3`
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((phase, n)) = self.pre {
            write!(f, "{}{}", phase.as_str(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_components() {
        let version = v("1.2.3rc4.post5.dev6");
        assert_eq!(version.release(), &[1, 2, 3]);
        assert_eq!(version.pre(), Some((PreRelease::Rc, 4)));
        assert_eq!(version.post(), Some(5));
        assert_eq!(version.dev(), Some(6));
        assert_eq!(version.as_str(), "1.2.3rc4.post5.dev6");
    }

    #[test]
    fn test_normalized_display() {
        assert_eq!(v("1.0-alpha-1").to_string(), "1.0a1");
        assert_eq!(v("1.0.BETA2").to_string(), "1.0b2");
        assert_eq!(v("1.0c3").to_string(), "1.0rc3");
        assert_eq!(v("1.0-1").to_string(), "1.0.post1");
        assert_eq!(v("1.0.rev2").to_string(), "1.0.post2");
        assert_eq!(v("v2.1.dev").to_string(), "2.1.dev0");
    }

    #[test]
    fn test_textually_different_equal() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0.0.0"));
        assert_eq!(v("v1.0"), v("1.0"));
        assert_eq!(v("1.0alpha1"), v("1.0a1"));
        assert_eq!(v("1.0-post1"), v("1.0.post1"));
    }

    #[test]
    fn test_numeric_release_ordering() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("1.0.1") > v("1.0"));
        assert!(v("0.9") < v("1.0"));
    }

    #[test]
    fn test_qualifier_ordering() {
        let ordered = [
            "1.0.dev1",
            "1.0.dev2",
            "1.0a1.dev1",
            "1.0a1",
            "1.0a2",
            "1.0b1",
            "1.0rc1",
            "1.0",
            "1.0.post1.dev1",
            "1.0.post1",
            "1.0.post2",
            "1.1.dev1",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} should sort below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_total_and_transitive() {
        let samples: Vec<Version> = [
            "0.9", "1.0", "1.0.0", "1.0a1", "1.0b2", "1.0rc1", "1.0.post1", "1.0.dev3",
            "1.5", "1.9", "2.0", "2.0.1", "10.0",
        ]
        .iter()
        .map(|s| v(s))
        .collect();

        for a in &samples {
            for b in &samples {
                let forward = a.cmp(b);
                assert_eq!(forward.reverse(), b.cmp(a));
                let holds = [a < b, a == b, a > b].iter().filter(|x| **x).count();
                assert_eq!(holds, 1);
                for c in &samples {
                    if a < b && b < c {
                        assert!(a < c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_invalid_versions() {
        for bad in ["", "abc", "1.0foo", "1..0", "1.0-", "dev", "1.0 beta"] {
            assert_eq!(
                Version::parse(bad),
                Err(VersionError::InvalidVersion(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(v("1.0"));
        assert!(set.contains(&v("1.0.0")));
        assert!(!set.contains(&v("1.0.1")));
    }
}
