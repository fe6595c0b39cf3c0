//! Version constraints: a comparison operator applied to a version.

mod constraint;

pub use constraint::{Constraint, ConstraintError};

use std::fmt;
use std::str::FromStr;

/// Comparison operators accepted in requirement lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    /// All operators in the order the parser should try them (longest first)
    pub const ALL: [Operator; 5] = [
        Operator::Equal,
        Operator::LessThanOrEqual,
        Operator::GreaterThanOrEqual,
        Operator::LessThan,
        Operator::GreaterThan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    pub fn supported_operators() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.as_str()).collect()
    }

    /// Whether the operator bounds versions from below, above, or both
    pub(crate) fn direction(&self) -> Option<Direction> {
        match self {
            Operator::LessThan | Operator::LessThanOrEqual => Some(Direction::Less),
            Operator::GreaterThan | Operator::GreaterThanOrEqual => Some(Direction::Greater),
            Operator::Equal => None,
        }
    }

    pub(crate) fn is_inclusive(&self) -> bool {
        matches!(
            self,
            Operator::Equal | Operator::LessThanOrEqual | Operator::GreaterThanOrEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Less,
    Greater,
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
