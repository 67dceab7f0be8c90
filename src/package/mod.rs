//! Package model, registry and dependency resolution
//!
//! A package is an immutable record of name, version, kind and dependency
//! edges, installed once per process and shared read-only by every consumer.
//! The resolver turns a set of requested names into a safe load order
//! (dependencies before dependents) or unload order (dependents before
//! dependencies), detecting cycles and missing dependencies.

pub mod error;
pub mod manifest;
pub mod registry;
pub mod resolver;

pub use error::{PackageError, PackageResult};
pub use manifest::{
    Package, PackageDependency, PackageInfo, PackageKind, PackageManifest, Version, MANIFEST_FILE,
};
pub use registry::PackageRegistry;
