//! Package descriptors and addon.toml manifest parsing

use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::package::error::{PackageError, PackageResult};

/// The manifest file name looked up in every package root
pub const MANIFEST_FILE: &str = "addon.toml";

/// What a package contributes to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Shared code only; ordered for dependency closure but never
    /// instantiated as tasks.
    Library,
    /// A scripted extension driven by the scheduler.
    Addon,
    /// A background extension, loaded like an addon.
    Service,
}

/// Package version: `major.minor.revision.build`, optionally followed by a
/// space and a free-form tag (`"1.2.0.4 beta"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Version {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Revision component
    pub revision: u32,
    /// Build component
    pub build: u32,
    /// Free-form tag suffix
    pub tag: String,
}

impl Version {
    /// Create a version from its numeric components.
    pub fn new(
        major: u32,
        minor: u32,
        revision: u32,
        build: u32,
    ) -> Self {
        Self {
            major,
            minor,
            revision,
            build,
            tag: String::new(),
        }
    }
}

impl FromStr for Version {
    type Err = Infallible;

    /// Parse leniently: absent or malformed numeric components read as zero,
    /// everything after the first space becomes the tag.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (numbers, tag) = match value.split_once(' ') {
            Some((n, t)) => (n, t.trim()),
            None => (value, ""),
        };
        let mut components = numbers.split('.').map(|c| c.parse::<u32>().unwrap_or(0));
        Ok(Version {
            major: components.next().unwrap_or(0),
            minor: components.next().unwrap_or(0),
            revision: components.next().unwrap_or(0),
            build: components.next().unwrap_or(0),
            tag: tag.to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.build
        )?;
        if !self.tag.is_empty() {
            write!(f, " {}", self.tag)?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.parse() {
            Ok(version) => Ok(version),
            Err(infallible) => match infallible {},
        }
    }
}

/// A named dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDependency {
    /// Name of the package depended on
    pub name: String,
    /// Required edges must resolve to an installed package or resolution
    /// fails; optional edges that fail to resolve are silently skipped.
    #[serde(default = "default_required")]
    pub required: bool,
}

impl PackageDependency {
    /// Create a required dependency edge.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// Create an optional dependency edge.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

fn default_required() -> bool {
    true
}

/// Represents the `[package]` section of addon.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,
    /// Package version
    #[serde(default)]
    pub version: Version,
    /// Package kind
    #[serde(default = "default_kind", rename = "type")]
    pub kind: PackageKind,
    /// Package description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_kind() -> PackageKind {
    PackageKind::Addon
}

/// Represents the complete addon.toml manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package metadata
    pub package: PackageInfo,
    /// Dependency edges
    #[serde(default, rename = "dependency", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PackageDependency>,
}

impl PackageManifest {
    /// Load manifest from a directory containing addon.toml
    pub fn load(dir: &Path) -> PackageResult<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(PackageError::NotPackage(dir.to_path_buf()));
        }
        let content = std::fs::read_to_string(&path)?;
        let manifest: PackageManifest = toml::from_str(&content)?;
        Ok(manifest)
    }

    /// Save manifest to a directory
    pub fn save(
        &self,
        dir: &Path,
    ) -> PackageResult<()> {
        let path = dir.join(MANIFEST_FILE);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

/// An installed package: immutable, shared read-only by every consumer.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    version: Version,
    kind: PackageKind,
    dependencies: Vec<PackageDependency>,
    root: Option<PathBuf>,
}

impl Package {
    /// Create a package record directly (no backing directory).
    pub fn new(
        name: impl Into<String>,
        version: Version,
        kind: PackageKind,
        dependencies: Vec<PackageDependency>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            kind,
            dependencies,
            root: None,
        }
    }

    /// Build a package from a parsed manifest.
    pub fn from_manifest(
        manifest: PackageManifest,
        root: Option<PathBuf>,
    ) -> Self {
        Self {
            name: manifest.package.name,
            version: manifest.package.version,
            kind: manifest.package.kind,
            dependencies: manifest.dependencies,
            root,
        }
    }

    /// Load the package rooted at `dir`.
    pub fn load(dir: &Path) -> PackageResult<Self> {
        let manifest = PackageManifest::load(dir)?;
        Ok(Self::from_manifest(manifest, Some(dir.to_path_buf())))
    }

    /// Get the package name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version.
    #[inline]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Get the package kind.
    #[inline]
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Get the dependency edges in manifest order.
    #[inline]
    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }

    /// Get the root directory, if the package is backed by one.
    #[inline]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Absolute path of a file inside the package.
    pub fn absolute_path(
        &self,
        relative: &Path,
    ) -> PackageResult<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.join(relative)),
            None => Err(PackageError::NoRoot(self.name.clone())),
        }
    }
}
