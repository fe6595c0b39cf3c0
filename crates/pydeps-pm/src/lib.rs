//! Transitive dependency resolution for Python packages.
//!
//! A [`Resolver`] walks the dependency graph of a package through a
//! [`PackageIndex`](index::PackageIndex). Two indexes are provided:
//!
//! - [`InMemoryIndex`](index::InMemoryIndex): a fixed `name-version` table
//! - [`RemoteIndex`](index::RemoteIndex): a PEP 503 repository whose source
//!   archives are downloaded, unpacked and inspected for their declared
//!   requirements
//!
//! [`Session`] wires a [`Config`] to either index.

pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod index;
pub mod metadata;
pub mod policy;
pub mod repository;
pub mod resolver;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use index::{InMemoryIndex, PackageIndex, RemoteIndex};
pub use resolver::{merge_specs, MergedSpec, Resolver, ResolverOptions, Revisit};
pub use session::Session;
