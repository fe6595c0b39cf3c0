//! Requirement specs: a package name plus an ordered list of predicates.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::constraint::{Constraint, ConstraintError, Operator};
use crate::version::Version;

lazy_static! {
    static ref REQUIREMENT_REGEX: Regex = Regex::new(
        r"^\s*(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<rest>.*?)\s*$"
    )
    .unwrap();
    static ref PREDICATE_REGEX: Regex =
        Regex::new(r"^(?P<op>==|<=|>=|<|>)\s*(?P<version>[^\s,]+)$").unwrap();
    static ref EXTRA_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap();
    static ref NAME_SEPARATORS: Regex = Regex::new(r"[-_.]+").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Invalid requirement \"{line}\": {reason}")]
    InvalidSpec { line: String, reason: String },

    #[error("Invalid requirement \"{line}\": {source}")]
    Constraint {
        line: String,
        #[source]
        source: ConstraintError,
    },
}

/// Normalize a project name the way package indexes compare them:
/// lowercase, with runs of `-`, `_` and `.` collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// A package requirement, e.g. `requests[socks]>=2.0,<3.0`.
///
/// `source` records which package declared the requirement and does not take
/// part in equality.
#[derive(Debug, Clone)]
pub struct Spec {
    name: String,
    extras: Vec<String>,
    preds: Vec<Constraint>,
    source: Option<String>,
}

impl Spec {
    /// A spec that accepts any version of `name`
    pub fn new(name: impl Into<String>) -> Self {
        Spec {
            name: name.into(),
            extras: Vec::new(),
            preds: Vec::new(),
            source: None,
        }
    }

    /// The synthetic `name==version` spec for a concrete package
    pub fn pinned(name: impl Into<String>, version: &Version) -> Self {
        Spec::new(name).with_predicate(Constraint::new(Operator::Equal, version.clone()))
    }

    pub fn with_predicate(mut self, predicate: Constraint) -> Self {
        self.preds.push(predicate);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add an extra unless it is already requested
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        let extra = extra.into();
        if !self.extras.iter().any(|e| e.eq_ignore_ascii_case(&extra)) {
            self.extras.push(extra);
        }
        self
    }

    /// Parse a requirement line, tagging the result with the package that
    /// declared it (if any).
    pub fn parse_line(line: &str, source: Option<&str>) -> Result<Self, SpecError> {
        let invalid = |reason: &str| SpecError::InvalidSpec {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        if line.contains(';') {
            return Err(invalid("environment markers are not supported"));
        }

        let caps = REQUIREMENT_REGEX
            .captures(line)
            .ok_or_else(|| invalid("expected a package name"))?;

        let extras = match caps.name("extras") {
            Some(m) => m
                .as_str()
                .split(',')
                .map(str::trim)
                .filter(|extra| !extra.is_empty())
                .map(|extra| {
                    if EXTRA_REGEX.is_match(extra) {
                        Ok(extra.to_string())
                    } else {
                        Err(invalid("malformed extra name"))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        // Legacy metadata wraps the predicates in parentheses: `foo (>=1.0)`
        let mut rest = caps.name("rest").map_or("", |m| m.as_str());
        if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            rest = inner.trim();
        }

        let mut preds = Vec::new();
        if !rest.is_empty() {
            for piece in rest.split(',') {
                let piece = piece.trim();
                let pred = PREDICATE_REGEX.captures(piece).ok_or_else(|| {
                    if piece.is_empty() {
                        invalid("empty version predicate")
                    } else if piece.starts_with(['!', '~', '=']) {
                        invalid(&format!(
                            "unsupported operator in \"{}\", expected one of: {}",
                            piece,
                            Operator::supported_operators().join(", ")
                        ))
                    } else {
                        invalid(&format!("malformed version predicate \"{}\"", piece))
                    }
                })?;
                let constraint = Constraint::from_str(&pred["op"], &pred["version"]).map_err(
                    |source| SpecError::Constraint {
                        line: line.to_string(),
                        source,
                    },
                )?;
                preds.push(constraint);
            }
        }

        Ok(Spec {
            name: caps["name"].to_string(),
            extras,
            preds,
            source: source.map(str::to_string),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name in normalized form, used for index lookups
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn preds(&self) -> &[Constraint] {
        &self.preds
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Check whether a version satisfies every predicate
    pub fn matches(&self, version: &Version) -> bool {
        self.preds.iter().all(|pred| pred.matches(version))
    }

    /// The pinned version if this spec is a single `==` predicate
    pub fn pinned_version(&self) -> Option<&Version> {
        match self.preds.as_slice() {
            [only] if only.operator() == Operator::Equal => Some(only.version()),
            _ => None,
        }
    }
}

impl PartialEq for Spec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.extras == other.extras && self.preds == other.preds
    }
}

impl Eq for Spec {}

impl FromStr for Spec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Spec::parse_line(s, None)
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let preds: Vec<String> = self.preds.iter().map(|p| p.to_string()).collect();
        f.write_str(&preds.join(","))
    }
}
