//! Workers shipped with the binary.

use tracing::debug;

use workerloop_core::{
    resident_memory, IterationContext, IterationError, RunOptions, WorkUnit, WorkerRegistry,
    SLEEP,
};

/// Writes a tick line every iteration.
#[derive(Debug, Default)]
pub struct Heartbeat {
    ticks: u64,
}

impl WorkUnit for Heartbeat {
    fn name(&self) -> &str {
        "heartbeat"
    }

    fn iterate(&mut self, context: &IterationContext<'_>) -> Result<(), IterationError> {
        self.ticks += 1;
        context.output.write_line(&format!("tick #{}", self.ticks));
        Ok(())
    }
}

/// Reports the resident memory of the process.
#[derive(Debug, Default)]
pub struct MemoryReport;

impl WorkUnit for MemoryReport {
    fn name(&self) -> &str {
        "memory-report"
    }

    fn default_options(&self) -> RunOptions {
        RunOptions::new().with(SLEEP, 5)
    }

    fn iterate(&mut self, context: &IterationContext<'_>) -> Result<(), IterationError> {
        let bytes = resident_memory().map_err(IterationError::Recoverable)?;
        debug!(bytes, "Sampled resident memory");
        context.output.write_line(&format!(
            "resident memory: {} bytes ({:.1} MiB)",
            bytes,
            bytes as f64 / (1024.0 * 1024.0)
        ));
        Ok(())
    }
}

pub fn registry() -> WorkerRegistry {
    WorkerRegistry::new()
        .with(Heartbeat::default())
        .with(MemoryReport)
}
