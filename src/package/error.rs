//! Package management error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by package resolution and manifest handling.
#[derive(Debug, Error)]
pub enum PackageError {
    /// A requested package is not installed
    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    /// A required dependency did not resolve to an installed package
    #[error("Missing dependency: {name} (required by {required_by})")]
    MissingDependency {
        /// Name of the unresolved dependency
        name: String,
        /// Package whose required edge failed
        required_by: String,
    },

    /// A required-dependency cycle was reached during resolution
    #[error("Dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// No manifest found at the package root
    #[error("Not a package: no addon.toml in {0}")]
    NotPackage(PathBuf),

    /// Path resolution requested on a package without a root directory
    #[error("Package '{0}' has no root directory")]
    NoRoot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization/deserialization error
    #[error("TOML parse error: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for PackageError {
    fn from(e: toml::de::Error) -> Self {
        PackageError::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for PackageError {
    fn from(e: toml::ser::Error) -> Self {
        PackageError::Toml(e.to_string())
    }
}

/// Result type for package operations
pub type PackageResult<T> = Result<T, PackageError>;
