//! Installed package registry.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::package::error::PackageResult;
use crate::package::manifest::{Package, MANIFEST_FILE};

/// Process-wide set of installed packages, keyed by name.
///
/// Insertion order is preserved so that full-set load and unload orders are
/// deterministic across runs. Created at startup; mutated only by install
/// and uninstall operations.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: IndexMap<String, Arc<Package>>,
}

impl PackageRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package, replacing any previous package of the same name.
    pub fn insert(
        &mut self,
        package: Package,
    ) -> Arc<Package> {
        let shared = Arc::new(package);
        self.packages
            .insert(shared.name().to_string(), Arc::clone(&shared));
        shared
    }

    /// Remove a package by name.
    pub fn remove(
        &mut self,
        name: &str,
    ) -> Option<Arc<Package>> {
        self.packages.shift_remove(name)
    }

    /// Look up an installed package.
    #[inline]
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Arc<Package>> {
        self.packages.get(name)
    }

    /// Installed package names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    /// Iterate installed packages in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.values()
    }

    /// Number of installed packages.
    #[inline]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check whether the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Remove all packages.
    pub fn clear(&mut self) {
        self.packages.clear();
    }

    /// Scan a directory of package roots and register every entry with a
    /// readable manifest. Returns the number of packages registered.
    ///
    /// Entries with a broken manifest are logged and skipped rather than
    /// failing the whole scan.
    pub fn scan(
        &mut self,
        dir: &Path,
    ) -> PackageResult<usize> {
        let mut count = 0;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if !entry.path().join(MANIFEST_FILE).exists() {
                continue;
            }
            match Package::load(entry.path()) {
                Ok(package) => {
                    debug!(target: "package", "registered '{}' {}", package.name(), package.version());
                    self.insert(package);
                    count += 1;
                }
                Err(e) => {
                    warn!(target: "package", "skipping {}: {}", entry.path().display(), e);
                }
            }
        }
        Ok(count)
    }
}
