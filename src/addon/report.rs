//! Fault reporting and command-surface collaborators.

use tracing::error;

/// Pseudo-name used when a fault has no owning package, e.g. work scheduled
/// from the ambient host context.
pub const HOST_PSEUDO_NAME: &str = "host";

/// External notification sink for task faults.
pub trait FaultSink {
    /// Report a fault attributed to `package`.
    fn report(
        &mut self,
        package: &str,
        fault: &str,
    );
}

/// Sink that writes faults to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl FaultSink for LogSink {
    fn report(
        &mut self,
        package: &str,
        fault: &str,
    ) {
        error!(target: "addon", "{}: {}", package, fault);
    }
}

/// Command-surface collaborator: unloading a package purges any command
/// bindings registered under its name.
pub trait CommandSink {
    /// Remove all command bindings owned by `package`.
    fn purge_package(
        &mut self,
        package: &str,
    );
}

/// Command sink for hosts with no command surface.
#[derive(Debug, Default)]
pub struct NullCommands;

impl CommandSink for NullCommands {
    fn purge_package(
        &mut self,
        _package: &str,
    ) {
    }
}
