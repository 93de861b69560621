use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::warn;

use crate::events::{EventKind, LifecycleEvent, Subscriber};

/// Process-level termination signal delivery.
pub trait SignalSource: Send + Sync {
    /// Sources that cannot deliver signals make [`StopOnSignal`] a no-op.
    fn is_supported(&self) -> bool {
        true
    }

    /// Install the process handler. Must be safe to call more than once.
    fn install(&self) -> anyhow::Result<()>;

    /// Returns true if a signal arrived since the last call.
    fn take_pending(&self) -> bool;
}

static PENDING: AtomicBool = AtomicBool::new(false);
static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

/// SIGINT, SIGTERM and SIGHUP on Unix, Ctrl-C on Windows, via `ctrlc`.
///
/// The handler only flips an atomic; the stop itself is applied by
/// [`StopOnSignal`] between iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminationSignal;

impl SignalSource for TerminationSignal {
    fn install(&self) -> anyhow::Result<()> {
        INSTALLED
            .get_or_init(|| {
                ctrlc::set_handler(|| PENDING.store(true, Ordering::SeqCst))
                    .map_err(|e| e.to_string())
            })
            .clone()
            .map_err(|e| anyhow::anyhow!("Failed to set termination signal handler: {}", e))
    }

    fn take_pending(&self) -> bool {
        PENDING.swap(false, Ordering::SeqCst)
    }
}

pub const SIGNAL_NOTICE: &str = "Termination signal received!";

/// Stops the worker when the process receives a termination signal.
pub struct StopOnSignal {
    source: Arc<dyn SignalSource>,
}

impl StopOnSignal {
    pub fn new(source: Arc<dyn SignalSource>) -> Self {
        Self { source }
    }

    pub fn is_active(&self) -> bool {
        self.source.is_supported()
    }
}

impl Subscriber for StopOnSignal {
    fn subscribed_events(&self) -> Vec<(EventKind, i32)> {
        if !self.is_active() {
            return vec![];
        }
        vec![(EventKind::Started, 100), (EventKind::Running, 100)]
    }

    fn on_event(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        match event.kind() {
            EventKind::Started => self.source.install()?,
            EventKind::Running => {
                if self.source.take_pending() {
                    warn!(worker = event.worker_name(), "{}", SIGNAL_NOTICE);
                    event.output().write_line(SIGNAL_NOTICE);
                    event.stop_worker();
                }
            }
            EventKind::Stopped => {}
        }
        Ok(())
    }
}
