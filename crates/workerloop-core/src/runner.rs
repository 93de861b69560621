use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::byte_size::parse_byte_size;
use crate::error::WorkerError;
use crate::events::Dispatcher;
use crate::observers::{MemoryLimit, SignalSource, StopOnSignal, TimeLimit};
use crate::options::{RunOptions, MEMORY_LIMIT, SLEEP, TIME_LIMIT};
use crate::output::Output;
use crate::registry::WorkerRegistry;
use crate::worker::Worker;

type MemorySampler = Box<dyn FnMut() -> anyhow::Result<u64> + Send>;

/// What to run and when to stop it.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub worker: String,
    /// Seconds between iterations, `None` keeps the worker's default
    pub sleep: Option<f64>,
    /// Human readable size, see [`parse_byte_size`]
    pub memory_limit: Option<String>,
    /// Seconds
    pub time_limit: Option<u64>,
}

impl RunRequest {
    pub fn new(worker: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            ..Default::default()
        }
    }

    pub fn with_sleep(mut self, secs: f64) -> Self {
        self.sleep = Some(secs);
        self
    }

    pub fn with_memory_limit(mut self, limit: impl Into<String>) -> Self {
        self.memory_limit = Some(limit.into());
        self
    }

    pub fn with_time_limit(mut self, secs: u64) -> Self {
        self.time_limit = Some(secs);
        self
    }

    /// Caller options passed to the worker, only the ones that were given.
    pub fn overrides(&self) -> RunOptions {
        let mut options = RunOptions::new();
        if let Some(sleep) = self.sleep {
            options.set(SLEEP, sleep);
        }
        if let Some(limit) = &self.memory_limit {
            options.set(MEMORY_LIMIT, limit.as_str());
        }
        if let Some(limit) = self.time_limit {
            options.set(TIME_LIMIT, limit);
        }
        options
    }
}

/// Selects a worker by name, wires the requested stop conditions and runs it.
pub struct WorkerRunner {
    registry: WorkerRegistry,
    signals: Arc<dyn SignalSource>,
    memory_sampler: Option<MemorySampler>,
}

impl WorkerRunner {
    pub fn new(registry: WorkerRegistry, signals: Arc<dyn SignalSource>) -> Self {
        Self {
            registry,
            signals,
            memory_sampler: None,
        }
    }

    /// Sampler for the memory limit instead of the process resident memory.
    pub fn with_memory_sampler(
        mut self,
        sampler: impl FnMut() -> anyhow::Result<u64> + Send + 'static,
    ) -> Self {
        self.memory_sampler = Some(Box::new(sampler));
        self
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn run(&mut self, request: &RunRequest, output: &dyn Output) -> Result<(), WorkerError> {
        if !self.registry.contains(&request.worker) {
            return Err(WorkerError::NotFound(request.worker.clone()));
        }

        if let Some(sleep) = request.sleep {
            Duration::try_from_secs_f64(sleep).map_err(|e| WorkerError::InvalidOption {
                option: SLEEP,
                message: format!("{} is not a usable number of seconds ({})", sleep, e),
            })?;
        }

        let mut dispatcher = Dispatcher::new();
        let mut stops_when = Vec::new();

        if let Some(limit) = request.time_limit.filter(|secs| *secs > 0) {
            stops_when.push(format!("been running for {}s", limit));
            dispatcher.add_subscriber(TimeLimit::new(Duration::from_secs(limit)));
        }

        if let Some(raw) = request.memory_limit.as_deref().filter(|s| !s.is_empty()) {
            let limit = parse_byte_size(raw).map_err(|e| WorkerError::InvalidOption {
                option: MEMORY_LIMIT,
                message: e.to_string(),
            })?;
            stops_when.push(format!("exceeded {} of memory", raw));
            let observer = match self.memory_sampler.take() {
                Some(sampler) => MemoryLimit::with_sampler(limit, sampler),
                None => MemoryLimit::new(limit),
            };
            dispatcher.add_subscriber(observer);
        }

        let on_signal = StopOnSignal::new(Arc::clone(&self.signals));
        if on_signal.is_active() {
            stops_when.push("received a termination signal".to_string());
        }
        dispatcher.add_subscriber(on_signal);

        if let Some(comment) = describe_stop_conditions(&stops_when) {
            output.comment(&comment);
        }

        let unit = self.registry.take(&request.worker)?;
        debug!(worker = %request.worker, "Selected worker");

        let mut worker = Worker::new(unit, dispatcher);
        worker.start(output, &request.overrides())
    }
}

/// "The worker will automatically exit once it has a, b or c."
pub fn describe_stop_conditions(conditions: &[String]) -> Option<String> {
    let (last, rest) = conditions.split_last()?;
    let joined = if rest.is_empty() {
        last.clone()
    } else {
        format!("{} or {}", rest.join(", "), last)
    };
    Some(format!(
        "The worker will automatically exit once it has {}.",
        joined
    ))
}
