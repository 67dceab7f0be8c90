//! Bridges one guest execution unit to the scheduler.

use std::time::Duration;

use crate::runtime::{Fault, FrameClock, Step, Task, Tasklet, WaitState};
use crate::script::channel::SleepChannel;
use crate::script::guest::{GuestContext, SleepRequest};

/// Lifecycle of a scripted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting out the initial delay before the first guest resume.
    InitialDelay,
    /// Alternating guest resumes and suspends.
    Running,
    /// The guest signalled completion.
    Completed,
}

/// Scheduler body driving one guest execution unit.
///
/// Each resume brackets the guest with the sleep channel, then interprets
/// the guest's suspend request into a wait condition: a time request maps
/// onto the wall-clock axis, a frame request onto the frame axis, and a
/// plain yield leaves the task runnable on the next pump pass.
pub struct ScriptTask<G: GuestContext> {
    guest: G,
    channel: SleepChannel,
    clock: FrameClock,
    initial_delay: Duration,
    phase: Phase,
}

impl<G: GuestContext> ScriptTask<G> {
    /// Create an adapter for `guest` with the given initial delay.
    pub fn new(
        guest: G,
        channel: SleepChannel,
        clock: FrameClock,
        initial_delay: Duration,
    ) -> Self {
        Self {
            guest,
            channel,
            clock,
            initial_delay,
            phase: Phase::InitialDelay,
        }
    }
}

impl<G: GuestContext> Tasklet for ScriptTask<G> {
    fn resume(&mut self) -> Result<Step, Fault> {
        match self.phase {
            Phase::InitialDelay => {
                self.phase = Phase::Running;
                Ok(Step::Yield(WaitState::sleep_for(self.initial_delay)))
            }
            Phase::Running => {
                self.channel.begin(self.guest.id());
                let resumed = self.guest.resume();
                self.channel.end();
                if resumed? {
                    let wait = match self.channel.take_request() {
                        Some(SleepRequest::Time(duration)) => WaitState::sleep_for(duration),
                        Some(SleepRequest::Frames(frames)) => {
                            WaitState::sleep_frames(&self.clock, frames)
                        }
                        // Plain yield: runnable again on the next pass.
                        None => WaitState::RESUME,
                    };
                    Ok(Step::Yield(wait))
                } else {
                    self.phase = Phase::Completed;
                    Ok(Step::Complete)
                }
            }
            Phase::Completed => Ok(Step::Complete),
        }
    }
}

/// Wrap a guest execution unit into a schedulable task.
pub fn create_task<G: GuestContext + 'static>(
    guest: G,
    channel: SleepChannel,
    clock: FrameClock,
    initial_delay: Duration,
) -> Task {
    Task::new(ScriptTask::new(guest, channel, clock, initial_delay))
}
