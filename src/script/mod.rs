//! Script host adapter
//!
//! Bridges one loaded package's guest execution context to the scheduler:
//! a script-level sleep request becomes a scheduler wait condition, the
//! guest is resumed on wake, and a fault raised inside guest code becomes a
//! reported error rather than a scheduler crash.
//!
//! The embedded interpreter itself is an external collaborator, consumed
//! only through the [`GuestContext`](guest::GuestContext) contract and the
//! [`SleepChannel`](channel::SleepChannel) side-channel.

pub mod adapter;
pub mod channel;
pub mod error;
pub mod guest;

pub use adapter::{create_task, ScriptTask};
pub use channel::SleepChannel;
pub use error::ScriptError;
pub use guest::{ContextId, GuestContext, SleepRequest};
