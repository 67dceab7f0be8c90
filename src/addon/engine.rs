//! Boundary to the embedded script interpreter.

use std::sync::Arc;

use crate::package::Package;
use crate::runtime::{Fault, FrameClock, Task};

/// Factory for guest execution units.
///
/// The interpreter itself is an external collaborator; the manager only
/// asks it for the entry tasks of a freshly loaded package, typically built
/// with [`crate::script::create_task`]. An instantiation fault aborts the
/// load of that package.
pub trait ScriptEngine {
    /// Produce the scheduled entry tasks for `package`.
    fn instantiate(
        &mut self,
        package: &Arc<Package>,
        clock: &FrameClock,
    ) -> Result<Vec<Task>, Fault>;
}
