//! Sleep side-channel between guest code and the host adapter.

use std::cell::RefCell;
use std::rc::Rc;

use crate::script::error::ScriptError;
use crate::script::guest::{ContextId, SleepRequest};

#[derive(Debug, Default)]
struct ChannelState {
    active: Option<ContextId>,
    pending: Option<SleepRequest>,
}

/// Shared sleep slot; clones refer to the same state.
///
/// The slot tracks which context is currently being pumped, so a sleep
/// requested on behalf of any other context is rejected: the scheduler
/// holds no handle to that context and could never wake it.
#[derive(Debug, Clone, Default)]
pub struct SleepChannel {
    state: Rc<RefCell<ChannelState>>,
}

impl SleepChannel {
    /// Create an empty channel.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a suspend request on behalf of `ctx`.
    ///
    /// Fails with [`ScriptError::UnschedulableContext`] when `ctx` is not
    /// the context currently being pumped.
    pub fn request_sleep(
        &self,
        ctx: ContextId,
        request: SleepRequest,
    ) -> Result<(), ScriptError> {
        let mut state = self.state.borrow_mut();
        if state.active != Some(ctx) {
            return Err(ScriptError::UnschedulableContext);
        }
        state.pending = Some(request);
        Ok(())
    }

    /// Mark `ctx` as the context being pumped, clearing any stale request.
    pub(crate) fn begin(
        &self,
        ctx: ContextId,
    ) {
        let mut state = self.state.borrow_mut();
        state.active = Some(ctx);
        state.pending = None;
    }

    /// Clear the active context after a resume returns.
    pub(crate) fn end(&self) {
        self.state.borrow_mut().active = None;
    }

    /// Read and clear the pending request.
    pub(crate) fn take_request(&self) -> Option<SleepRequest> {
        self.state.borrow_mut().pending.take()
    }
}
