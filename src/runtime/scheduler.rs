//! Cooperative single-threaded task scheduler.
//!
//! The scheduler owns a collection of suspended tasks. Each pump resumes
//! every task whose wait condition is satisfied, repeating full passes until
//! a pass resumes nothing, then reports the merged wait condition of
//! everything still suspended as the host's "nothing to do before" hint.
//! Repeating until a quiet pass lets a chain of wakeups (task A making task
//! B immediately runnable) complete within one host tick.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use tracing::trace;

use super::clock::FrameClock;
use super::task::{Fault, Tag, Task};
use super::wait::WaitState;

/// Recovery decision for a task fault: `true` suppresses the fault and the
/// pump continues with other tasks.
pub type ErrorHandler = Box<dyn FnMut(&Fault, Tag) -> bool>;

/// Deferred task registration handle.
///
/// Cloneable and usable from inside a task body; queued tasks join the
/// scheduler at the next pump-pass boundary, so bodies never touch the task
/// collection directly.
#[derive(Clone, Default)]
pub struct Spawner {
    queue: Rc<RefCell<Vec<Task>>>,
}

impl Spawner {
    /// Queue a task for registration under `tag`.
    pub fn spawn(
        &self,
        mut task: Task,
        tag: Tag,
    ) {
        task.set_tag(tag);
        self.queue.borrow_mut().push(task);
    }

    fn drain(&self) -> Vec<Task> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    fn retain(
        &self,
        keep: impl FnMut(&Task) -> bool,
    ) {
        self.queue.borrow_mut().retain(keep);
    }
}

/// Single-threaded cooperative scheduler.
///
/// The task collection is mutated only by the pump's own bookkeeping, never
/// by task bodies, so a fault inside one task cannot corrupt the others.
/// `run_until_idle` is not re-entrant; task bodies hold a [`Spawner`] at
/// most, never a scheduler reference.
pub struct Scheduler {
    tasks: Vec<Task>,
    clock: FrameClock,
    spawner: Spawner,
    error_handler: Option<ErrorHandler>,
}

impl Scheduler {
    /// Create a scheduler with a fresh frame clock.
    #[inline]
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    /// Create a scheduler driven by an existing frame clock.
    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            tasks: Vec::new(),
            clock,
            spawner: Spawner::default(),
            error_handler: None,
        }
    }

    /// Get the frame clock driving frame-based waits.
    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Get a handle for registering tasks from inside task bodies.
    #[inline]
    pub fn spawner(&self) -> Spawner {
        self.spawner.clone()
    }

    /// Register a task under `tag`.
    ///
    /// The task's own first wait condition decides when it first runs.
    pub fn schedule(
        &mut self,
        mut task: Task,
        tag: Tag,
    ) {
        task.set_tag(tag);
        self.tasks.push(task);
    }

    /// Number of tasks in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Install a fault recovery handler.
    pub fn set_error_handler(
        &mut self,
        handler: impl FnMut(&Fault, Tag) -> bool + 'static,
    ) {
        self.error_handler = Some(Box::new(handler));
    }

    /// Remove the fault recovery handler.
    pub fn clear_error_handler(&mut self) {
        self.error_handler = None;
    }

    /// Resume every runnable task until none remain runnable in the current
    /// instant, then return the merged wait condition of the rest.
    ///
    /// Within a pass tasks are resumed in registration order. A fault in one
    /// task is handed to the installed handler; if the handler recovers, the
    /// faulting task is marked done and the pump continues. If it declines,
    /// or no handler is installed, the faulting task is dropped from
    /// bookkeeping without completing and the fault aborts the pump. Tasks
    /// already processed keep their updated state either way.
    pub fn run_until_idle(&mut self) -> Result<WaitState, Fault> {
        self.admit_spawned();
        if self.tasks.is_empty() {
            return Ok(WaitState::SUSPEND);
        }

        let mut wait = WaitState::SUSPEND;
        let mut idle = false;
        while !idle {
            idle = true;
            wait = WaitState::SUSPEND;
            let now = Instant::now();
            let frame = self.clock.current();

            let mut index = 0;
            while index < self.tasks.len() {
                let task = &mut self.tasks[index];
                if !task.done() && task.wait_state().is_due(now, frame) {
                    let tag = task.tag();
                    match task.resume() {
                        Ok(next) => {
                            wait = WaitState::min(wait, next);
                        }
                        Err(fault) => {
                            let recovered = self
                                .error_handler
                                .as_mut()
                                .is_some_and(|handler| handler(&fault, tag));
                            if recovered {
                                trace!(%tag, "task fault recovered by handler");
                                self.tasks[index].mark_done();
                            } else {
                                self.tasks.remove(index);
                                return Err(fault);
                            }
                        }
                    }
                    idle = false;
                } else if !task.done() {
                    wait = WaitState::min(wait, task.wait_state());
                }
                index += 1;
            }

            // Tasks spawned by a resumed body join before the next pass; a
            // spawn implies a resume happened, so the loop cannot be idle.
            self.admit_spawned();
        }

        self.tasks.retain(|task| !task.done());
        Ok(wait)
    }

    /// Remove all tasks with a matching tag.
    ///
    /// Atomic with respect to the pump: purge never interrupts an in-flight
    /// resume, it only runs between pumps or from the host side.
    pub fn purge(
        &mut self,
        tag: Tag,
    ) {
        self.tasks.retain(|task| task.tag() != tag);
        self.spawner.retain(|task| task.tag() != tag);
    }

    /// Discard all tasks unconditionally.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.spawner.retain(|_| false);
    }

    fn admit_spawned(&mut self) {
        self.tasks.append(&mut self.spawner.drain());
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
