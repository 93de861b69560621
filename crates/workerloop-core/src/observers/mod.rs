//! Stop-condition observers.
//!
//! Each observer is a [`Subscriber`](crate::Subscriber) that may stop the
//! worker when it is notified with [`EventKind::Running`](crate::EventKind).
//! They keep no shared state, so any combination can be registered on the
//! same dispatcher.

mod memory_limit;
mod signal;
mod time_limit;

pub use memory_limit::{resident_memory, MemoryLimit};
pub use signal::{SignalSource, StopOnSignal, TerminationSignal, SIGNAL_NOTICE};
pub use time_limit::TimeLimit;
