//! Cooperative runtime: wait conditions, frame clock, tasks and scheduler
//!
//! "Concurrency" here means logically overlapping suspended computations
//! sharing one call stack over time, not simultaneous execution. The
//! scheduler is strictly single-threaded; a task that never yields blocks
//! the whole host tick, and that is an accepted trade-off.
//!
//! # Architecture
//!
//! - [`WaitState`](wait::WaitState) - the earliest (wall-clock, frame) point
//!   at which a suspended task becomes runnable
//! - [`FrameClock`](clock::FrameClock) - shared host frame counter
//! - [`Tasklet`](task::Tasklet) - the resumable-computation contract
//! - [`Task`](task::Task) - a scheduled body plus its bookkeeping
//! - [`Scheduler`](scheduler::Scheduler) - the pump loop
//! - [`Spawner`](scheduler::Spawner) - deferred registration from task bodies

pub mod clock;
pub mod scheduler;
pub mod task;
pub mod wait;

pub use clock::FrameClock;
pub use scheduler::{Scheduler, Spawner};
pub use task::{Fault, Step, Tag, Task, Tasklet};
pub use wait::{Deadline, WaitState};
