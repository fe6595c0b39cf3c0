//! Single version constraint implementation

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use super::{Direction, Operator};
use crate::version::{Version, VersionError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Invalid operator \"{operator}\", expected one of: {expected}")]
    InvalidOperator { operator: String, expected: String },

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),
}

/// A single version constraint (e.g., ">=1.0")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    operator: Operator,
    version: Version,
}

impl Constraint {
    /// Create a new constraint
    pub fn new(operator: Operator, version: Version) -> Self {
        Constraint { operator, version }
    }

    /// Create a constraint from operator and version strings
    pub fn from_str(operator: &str, version: &str) -> Result<Self, ConstraintError> {
        let op = operator
            .parse::<Operator>()
            .map_err(|_| ConstraintError::InvalidOperator {
                operator: operator.to_string(),
                expected: Operator::supported_operators().join(", "),
            })?;
        Ok(Self::new(op, Version::parse(version)?))
    }

    /// Get the version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Get the operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Check whether a concrete version satisfies this constraint
    pub fn matches(&self, candidate: &Version) -> bool {
        let cmp = candidate.cmp(&self.version);
        match self.operator {
            Operator::Equal => cmp == Ordering::Equal,
            Operator::LessThan => cmp == Ordering::Less,
            Operator::LessThanOrEqual => cmp != Ordering::Greater,
            Operator::GreaterThan => cmp == Ordering::Greater,
            Operator::GreaterThanOrEqual => cmp != Ordering::Less,
        }
    }

    /// Check whether some version could satisfy both constraints at once
    pub fn intersects(&self, other: &Constraint) -> bool {
        if self.operator == Operator::Equal {
            return other.matches(&self.version);
        }
        if other.operator == Operator::Equal {
            return self.matches(&other.version);
        }

        // Same direction comparisons always have a solution (both < or both >)
        let self_direction = self.operator.direction();
        if self_direction == other.operator.direction() {
            return true;
        }

        let (lower, upper) = match self_direction {
            Some(Direction::Greater) => (self, other),
            _ => (other, self),
        };

        match lower.version.cmp(&upper.version) {
            Ordering::Less => true,
            // e.g. >=2 and <=2 meet at 2, but >2 and <=2 never do
            Ordering::Equal => lower.operator.is_inclusive() && upper.operator.is_inclusive(),
            Ordering::Greater => false,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version.as_str())
    }
}
