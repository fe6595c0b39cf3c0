//! Version ordering and requirement specs for Python packages.
//!
//! - [`Version`]: PEP 386/440 compatible normalized versions with a total order
//! - [`Constraint`]: one `(operator, version)` predicate
//! - [`Spec`]: a package name plus an ordered list of predicates

pub mod constraint;
pub mod spec;
pub mod version;

pub use constraint::{Constraint, ConstraintError, Operator};
pub use spec::{normalize_name, Spec, SpecError};
pub use version::{PreRelease, Version, VersionError};
