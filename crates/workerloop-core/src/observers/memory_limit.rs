use tracing::info;

use crate::events::{EventKind, LifecycleEvent, Subscriber};

type MemorySampler = Box<dyn FnMut() -> anyhow::Result<u64> + Send>;

/// Stops the worker once the sampled memory usage exceeds a byte ceiling.
pub struct MemoryLimit {
    limit: u64,
    sampler: MemorySampler,
}

impl MemoryLimit {
    /// Samples the resident memory of the current process.
    pub fn new(limit: u64) -> Self {
        Self::with_sampler(limit, resident_memory)
    }

    pub fn with_sampler(
        limit: u64,
        sampler: impl FnMut() -> anyhow::Result<u64> + Send + 'static,
    ) -> Self {
        Self {
            limit,
            sampler: Box::new(sampler),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Subscriber for MemoryLimit {
    fn subscribed_events(&self) -> Vec<(EventKind, i32)> {
        vec![(EventKind::Running, 0)]
    }

    fn on_event(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        let memory = (self.sampler)()?;
        if memory > self.limit {
            event.stop_worker();
            info!(
                limit = self.limit,
                memory,
                "Worker stopped due to memory limit of {} bytes exceeded ({} bytes used)",
                self.limit,
                memory
            );
        }
        Ok(())
    }
}

/// Resident set size of the current process in bytes.
#[cfg(target_os = "linux")]
pub fn resident_memory() -> anyhow::Result<u64> {
    use anyhow::Context;

    let status = std::fs::read_to_string("/proc/self/status")
        .context("Failed to read /proc/self/status")?;
    parse_vm_rss(&status).context("VmRSS missing from /proc/self/status")
}

#[cfg(not(target_os = "linux"))]
pub fn resident_memory() -> anyhow::Result<u64> {
    anyhow::bail!("Resident memory sampling is not supported on this platform")
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kib: u64 = line
        .trim_start_matches("VmRSS:")
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(kib * 1024)
}
