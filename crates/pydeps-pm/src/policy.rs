use pydeps_semver::Version;

/// Policy for selecting between candidate versions.
///
/// When multiple versions satisfy a spec, the policy determines which one
/// is the best match.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Prefer lowest versions (for testing minimum bounds)
    pub prefer_lowest: bool,
}

impl Policy {
    /// Create a new policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set preference for lowest versions
    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Sort candidates by preference (best first).
    pub fn select_preferred<T, F>(&self, mut candidates: Vec<T>, version_of: F) -> Vec<T>
    where
        F: Fn(&T) -> &Version,
    {
        candidates.sort_by(|a, b| {
            let version_cmp = version_of(a).cmp(version_of(b));
            if self.prefer_lowest {
                version_cmp
            } else {
                version_cmp.reverse()
            }
        });
        candidates
    }

    /// Select a single best candidate
    pub fn select_best<T, F>(&self, candidates: Vec<T>, version_of: F) -> Option<T>
    where
        F: Fn(&T) -> &Version,
    {
        self.select_preferred(candidates, version_of).into_iter().next()
    }
}
