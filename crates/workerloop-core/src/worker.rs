use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{IterationError, WorkerError};
use crate::events::{Dispatcher, EventKind, LifecycleEvent};
use crate::options::{RunOptions, SLEEP};
use crate::output::Output;
use crate::stop::StopHandle;

/// What a single iteration gets to see.
pub struct IterationContext<'a> {
    /// 1-based, counts recoverable failures too
    pub iteration: u64,
    pub output: &'a dyn Output,
    pub options: &'a RunOptions,
    pub stop: &'a StopHandle,
}

impl IterationContext<'_> {
    /// Stop the worker once this iteration returns.
    pub fn stop(&self) {
        self.stop.stop();
    }
}

/// The unit of work a worker repeats until it is stopped.
pub trait WorkUnit: Send {
    /// Identifier used to select the worker, e.g. from the command line.
    fn name(&self) -> &str;

    /// Options of this worker type, overridden by the caller's options.
    fn default_options(&self) -> RunOptions {
        RunOptions::new().with(SLEEP, 10)
    }

    fn iterate(&mut self, context: &IterationContext<'_>) -> Result<(), IterationError>;
}

impl<T: WorkUnit + ?Sized> WorkUnit for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn default_options(&self) -> RunOptions {
        (**self).default_options()
    }

    fn iterate(&mut self, context: &IterationContext<'_>) -> Result<(), IterationError> {
        (**self).iterate(context)
    }
}

type SleepFn = Box<dyn FnMut(Duration) + Send>;

/// Runs a [`WorkUnit`] until its stop flag is set
pub struct Worker {
    unit: Box<dyn WorkUnit>,
    dispatcher: Dispatcher,
    stop: StopHandle,
    sleep: SleepFn,
}

impl Worker {
    pub fn new(unit: impl WorkUnit + 'static, dispatcher: Dispatcher) -> Self {
        Self {
            unit: Box::new(unit),
            dispatcher,
            stop: StopHandle::new(),
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the blocking inter-iteration sleep.
    pub fn with_sleep_fn(mut self, sleep: impl FnMut(Duration) + Send + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn name(&self) -> &str {
        self.unit.name()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Run the loop until the worker is stopped.
    ///
    /// A fatal iteration error (or a failing `Running` subscriber) sets the
    /// stop flag and is returned as is; `Stopped` is only published after a
    /// normal stop.
    pub fn start(&mut self, output: &dyn Output, overrides: &RunOptions) -> Result<(), WorkerError> {
        let options = RunOptions::resolve(&self.unit.default_options(), overrides);
        let name = self.unit.name().to_string();
        let sleep = options.sleep();

        info!(worker = %name, sleep_secs = sleep.as_secs_f64(), "Worker started");
        self.publish(EventKind::Started, &name, output, &options)
            .map_err(WorkerError::Observer)?;

        let mut iteration = 0;
        while !self.stop.is_stopped() {
            if let Err(e) = self.publish(EventKind::Running, &name, output, &options) {
                return Err(self.fail(&name, WorkerError::Observer(e)));
            }
            if self.stop.is_stopped() {
                break;
            }

            iteration += 1;
            debug!(worker = %name, iteration, "Running iteration");
            let context = IterationContext {
                iteration,
                output,
                options: &options,
                stop: &self.stop,
            };
            match self.unit.iterate(&context) {
                Ok(()) => {}
                Err(IterationError::Recoverable(e)) => {
                    error!(worker = %name, iteration, error = %e, "Recoverable error during iteration");
                    continue;
                }
                Err(IterationError::Fatal(e)) => {
                    return Err(self.fail(&name, WorkerError::Iteration(e)));
                }
            }

            if !sleep.is_zero() {
                (self.sleep)(sleep);
            }
        }

        self.publish(EventKind::Stopped, &name, output, &options)
            .map_err(WorkerError::Observer)?;
        info!(worker = %name, iterations = iteration, "Worker stopped");

        Ok(())
    }

    fn publish(
        &mut self,
        kind: EventKind,
        name: &str,
        output: &dyn Output,
        options: &RunOptions,
    ) -> anyhow::Result<()> {
        let event = LifecycleEvent::new(kind, name, &self.stop, output, options);
        self.dispatcher.publish(&event)
    }

    fn fail(&self, name: &str, err: WorkerError) -> WorkerError {
        error!(worker = %name, error = %err, "Worker failed");
        self.stop.stop();
        err
    }
}
