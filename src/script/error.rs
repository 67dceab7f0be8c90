//! Script host error types

use thiserror::Error;

/// Errors raised by the script host adapter.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Sleep requested from an execution context the scheduler does not
    /// currently own a handle to. Always fatal to the requesting call.
    #[error("Attempt to sleep from an unschedulable execution context")]
    UnschedulableContext,
}
