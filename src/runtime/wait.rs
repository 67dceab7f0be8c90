//! Wait conditions for suspended tasks.
//!
//! A task's wake point lives in (wall-clock, frame-count) space. Both axes
//! must be due before the task is runnable; in practice a wait sets only one
//! axis and leaves the other at its always-satisfied value, but the AND
//! combinator lets a dual-axis wait compose without a new primitive.

use std::time::{Duration, Instant};

use super::clock::FrameClock;

/// A point on the wall-clock axis.
///
/// `Past` is satisfied by every instant and `Never` by none; they stand in
/// for the unrepresentable minimum and maximum of [`Instant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Deadline {
    /// Already elapsed.
    Past,
    /// Due at a concrete instant.
    At(Instant),
    /// Never due.
    Never,
}

impl Deadline {
    /// Check whether this deadline has been reached at `now`.
    #[inline]
    pub fn is_due(
        &self,
        now: Instant,
    ) -> bool {
        match self {
            Deadline::Past => true,
            Deadline::At(instant) => *instant <= now,
            Deadline::Never => false,
        }
    }
}

/// The earliest point at which a suspended task becomes runnable again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitState {
    /// Wall-clock axis.
    pub time: Deadline,
    /// Frame-count axis.
    pub frame: u64,
}

impl WaitState {
    /// Runnable immediately.
    pub const RESUME: WaitState = WaitState {
        time: Deadline::Past,
        frame: 0,
    };

    /// Never runnable without an external signal.
    pub const SUSPEND: WaitState = WaitState {
        time: Deadline::Never,
        frame: u64::MAX,
    };

    /// Check whether both axes are due at the given instant and frame.
    #[inline]
    pub fn is_due(
        &self,
        now: Instant,
        frame: u64,
    ) -> bool {
        self.time.is_due(now) && self.frame <= frame
    }

    /// Pointwise minimum of each axis independently.
    ///
    /// Commutative, associative and idempotent; [`WaitState::RESUME`]
    /// dominates any value and [`WaitState::SUSPEND`] is the identity.
    #[inline]
    pub fn min(
        a: WaitState,
        b: WaitState,
    ) -> WaitState {
        WaitState {
            time: a.time.min(b.time),
            frame: a.frame.min(b.frame),
        }
    }

    /// Wait until a concrete instant.
    #[inline]
    pub fn sleep_until(instant: Instant) -> WaitState {
        WaitState {
            time: Deadline::At(instant),
            frame: 0,
        }
    }

    /// Wait for a wall-clock duration from now.
    #[inline]
    pub fn sleep_for(duration: Duration) -> WaitState {
        Self::sleep_until(Instant::now() + duration)
    }

    /// Wait until `frames` more host frames have elapsed.
    #[inline]
    pub fn sleep_frames(
        clock: &FrameClock,
        frames: u64,
    ) -> WaitState {
        WaitState {
            time: Deadline::Past,
            frame: clock.current().saturating_add(frames),
        }
    }
}

impl Default for WaitState {
    fn default() -> Self {
        Self::RESUME
    }
}
