//! Kindling host configuration
//!
//! A single TOML file describing where installed packages live and how the
//! host should behave.
//!
//! # Usage
//!
//! ```rust,no_run
//! use kindling::util::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::load("kindling.toml").unwrap();
//! let registry = config.build_registry().unwrap();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::package::PackageRegistry;
use crate::util::logger::LogLevel;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "kindling.toml";

/// Host configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Directories scanned for installed packages
    #[serde(default = "default_addon_dirs")]
    pub addon_dirs: Vec<PathBuf>,
    /// Logging verbosity
    #[serde(default)]
    pub log_level: LogLevel,
    /// Packages loaded automatically at startup
    #[serde(default)]
    pub autoload: Vec<String>,
}

fn default_addon_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("addons")]
}

impl RuntimeConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self {
                addon_dirs: default_addon_dirs(),
                ..Self::default()
            });
        }
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to `path`.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path.as_ref(), content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// Scan every configured directory into a fresh registry.
    ///
    /// Directories that cannot be read are skipped with a warning; the
    /// remaining directories still contribute their packages.
    pub fn build_registry(&self) -> Result<PackageRegistry, ConfigError> {
        let mut registry = PackageRegistry::new();
        for dir in &self.addon_dirs {
            if let Err(e) = registry.scan(dir) {
                warn!(target: "config", "skipping addon dir {}: {}", dir.display(), e);
            }
        }
        Ok(registry)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[source] toml::de::Error),
    #[error("Config serialize error: {0}")]
    Serialize(#[source] toml::ser::Error),
}
