//! Host frame counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cloneable handle over a shared frame counter.
///
/// The host calls [`FrameClock::next_frame`] once per render/update cycle;
/// frame-based wait evaluation reads [`FrameClock::current`]. Every clone
/// observes the same counter, so the scheduler and its script adapters stay
/// in agreement about "now".
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: Arc<AtomicU64>,
}

impl FrameClock {
    /// Create a clock starting at frame zero.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the frame counter by one.
    #[inline]
    pub fn next_frame(&self) {
        self.frame.fetch_add(1, Ordering::SeqCst);
    }

    /// Get the current frame number.
    #[inline]
    pub fn current(&self) -> u64 {
        self.frame.load(Ordering::SeqCst)
    }
}
