//! Addon lifecycle orchestration
//!
//! The manager ties the other components together: it asks the resolver for
//! load and unload orders, instantiates script tasks for every non-library
//! package, and on a task fault unloads only the offending package.

pub mod engine;
pub mod manager;
pub mod report;

pub use engine::ScriptEngine;
pub use manager::{AddonError, AddonManager, AddonResult};
pub use report::{CommandSink, FaultSink, LogSink, NullCommands, HOST_PSEUDO_NAME};
