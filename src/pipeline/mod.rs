//! Watch pipeline.
//!
//! - [`Checker`]: fetch one target, diff against the stored digest, notify and persist
//! - [`Watcher`]: pull invocations from the control plane and report their outcome

pub mod check;
pub mod watch;

pub use check::{Change, Checker};
pub use watch::{PollOutcome, Watcher};
