//! Guest execution context boundary.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::runtime::Fault;

/// Identity of one guest execution context.
///
/// A raw comparison key: the adapter uses it to verify that a sleep request
/// came from the context currently being pumped, never to reach back into
/// interpreter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate a fresh context id.
    pub fn next() -> ContextId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Context({})", self.0)
    }
}

/// A guest's suspend request, read from the sleep side-channel.
///
/// The guest interpreter has no native suspend-payload type, so the request
/// travels as a tagged union through a dedicated slot instead of a return
/// value, keeping the suspend protocol decoupled from the guest's own
/// call/return convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepRequest {
    /// Sleep for a wall-clock duration.
    Time(Duration),
    /// Sleep until the given number of host frames have elapsed.
    Frames(u64),
}

/// One guest execution unit, typically a coroutine inside the embedded
/// interpreter.
pub trait GuestContext {
    /// The identity this guest presents to the sleep channel.
    fn id(&self) -> ContextId;

    /// Run guest code until it yields (`Ok(true)`), completes (`Ok(false)`)
    /// or raises a fault.
    fn resume(&mut self) -> Result<bool, Fault>;
}
