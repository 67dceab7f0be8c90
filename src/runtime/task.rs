//! Task definitions for the cooperative scheduler.
//!
//! A task is a suspended computation with a mutable wait condition, an
//! opaque owner tag used for bulk cancellation, and a completion flag. The
//! suspension mechanism itself is an implementation detail behind the
//! [`Tasklet`] contract: the scheduler only ever calls `resume`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::wait::WaitState;

/// The fault payload captured when a task body raises an error.
pub type Fault = anyhow::Error;

/// Opaque key grouping tasks by owner, used for bulk cancellation.
///
/// Owners never hold references into scheduler storage, only the tag value;
/// this keeps owner lifetimes decoupled from the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(u64);

impl Tag {
    /// Ambient host work with no owning package.
    pub const HOST: Tag = Tag(0);

    /// Allocate a fresh tag.
    pub fn next() -> Tag {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Tag(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Tag {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

/// Outcome of resuming a task body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Suspend again with a new wait condition.
    Yield(WaitState),
    /// The computation has finished.
    Complete,
}

/// A resumable computation.
pub trait Tasklet {
    /// Run the computation until its next suspension point.
    fn resume(&mut self) -> Result<Step, Fault>;
}

impl<F> Tasklet for F
where
    F: FnMut() -> Result<Step, Fault>,
{
    fn resume(&mut self) -> Result<Step, Fault> {
        self()
    }
}

/// A scheduled unit of work: a suspended body plus its bookkeeping.
///
/// Owned exclusively by the scheduler's task collection from registration
/// until it completes or is purged.
pub struct Task {
    body: Box<dyn Tasklet>,
    wait: WaitState,
    tag: Tag,
    done: bool,
}

impl fmt::Debug for Task {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Task")
            .field("wait", &self.wait)
            .field("tag", &self.tag)
            .field("done", &self.done)
            .finish()
    }
}

impl Task {
    /// Wrap a resumable body. Runnable immediately by default.
    pub fn new(body: impl Tasklet + 'static) -> Self {
        Self {
            body: Box::new(body),
            wait: WaitState::RESUME,
            tag: Tag::HOST,
            done: false,
        }
    }

    /// Override the first wait condition.
    #[inline]
    pub fn with_wait(
        mut self,
        wait: WaitState,
    ) -> Self {
        self.wait = wait;
        self
    }

    /// Get the current wait condition.
    #[inline]
    pub fn wait_state(&self) -> WaitState {
        self.wait
    }

    /// Get the owner tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Check whether the task has completed.
    #[inline]
    pub fn done(&self) -> bool {
        self.done
    }

    #[inline]
    pub(crate) fn set_tag(
        &mut self,
        tag: Tag,
    ) {
        self.tag = tag;
    }

    #[inline]
    pub(crate) fn mark_done(&mut self) {
        self.done = true;
    }

    /// Resume the body and refresh the wait condition from its yield.
    ///
    /// A completed task contributes [`WaitState::SUSPEND`] so it never
    /// lowers the scheduler's merged wake point.
    pub(crate) fn resume(&mut self) -> Result<WaitState, Fault> {
        match self.body.resume()? {
            Step::Yield(wait) => {
                self.wait = wait;
                Ok(wait)
            }
            Step::Complete => {
                self.done = true;
                self.wait = WaitState::SUSPEND;
                Ok(WaitState::SUSPEND)
            }
        }
    }
}
