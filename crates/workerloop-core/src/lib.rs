//! # workerloop-core
//!
//! A worker repeats a [`WorkUnit`] until it is stopped. Stop conditions are
//! independent [`Subscriber`]s of the worker's lifecycle events:
//!
//! - [`TimeLimit`] - wall-clock budget
//! - [`MemoryLimit`] - resident memory ceiling
//! - [`StopOnSignal`] - operator termination signal
//!
//! ## Run loop
//!
//! ```text
//! Started ─► ┌─► Running ─► iterate ─┬─ ok ──────────► sleep ─┐
//!            │                       ├─ recoverable ──────────┤
//!            └───────── until the stop flag is set ◄──────────┘
//!                                    └─ fatal ─► stop, return Err (no Stopped)
//! Stopped
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use workerloop_core::{RunRequest, TerminationSignal, WorkerRegistry, WorkerRunner, NullOutput};
//!
//! let registry = WorkerRegistry::new().with(MyUnit::default());
//! let mut runner = WorkerRunner::new(registry, Arc::new(TerminationSignal));
//! runner.run(&RunRequest::new("my-unit").with_time_limit(60), &NullOutput)?;
//! ```

mod byte_size;
mod error;
mod events;
mod observers;
mod options;
mod output;
mod registry;
mod runner;
mod stop;
mod worker;

pub use byte_size::{parse_byte_size, ByteSizeError};
pub use error::{IterationError, WorkerError};
pub use events::{Dispatcher, EventKind, LifecycleEvent, Subscriber};
pub use observers::{
    resident_memory, MemoryLimit, SignalSource, StopOnSignal, TerminationSignal, TimeLimit,
    SIGNAL_NOTICE,
};
pub use options::{RunOptions, MEMORY_LIMIT, SLEEP, TIME_LIMIT};
pub use output::{BufferedOutput, NullOutput, Output};
pub use registry::WorkerRegistry;
pub use runner::{describe_stop_conditions, RunRequest, WorkerRunner};
pub use stop::StopHandle;
pub use worker::{IterationContext, WorkUnit, Worker};
