//! Kindling cooperative addon runtime
//!
//! Runs many independently authored extension packages inside a single host
//! process, sharing one logical tick without preemptive threads. The runtime
//! computes a deterministic load/unload order for packages with dependency
//! edges, and multiplexes any number of logical tasks over a single execution
//! context. A task may suspend for a wall-clock duration, for a number of
//! host frames, or indefinitely; a fault in one task degrades to "that
//! package is unloaded" rather than a scheduler crash.
//!
//! # Example
//!
//! ```no_run
//! use kindling::addon::AddonManager;
//! use kindling::package::PackageRegistry;
//!
//! # fn engine() -> Box<dyn kindling::addon::ScriptEngine> { unimplemented!() }
//! fn main() -> kindling::Result<()> {
//!     let mut registry = PackageRegistry::new();
//!     registry.scan("addons".as_ref())?;
//!
//!     let mut manager = AddonManager::new(registry, engine());
//!     manager.load(&["distance", "timers"])?;
//!     loop {
//!         let _wait = manager.tick()?;
//!         // render, handle input, ...
//!     }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/kindling")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod addon;
pub mod package;
pub mod runtime;
pub mod script;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime name
pub const NAME: &str = "Kindling";
