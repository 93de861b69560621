//! Configuration file support for workerloop.
//!
//! Loads `workerloop.toml` from the working directory, falling back to
//! `<config dir>/workerloop/config.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "workerloop.toml";

/// Configuration loaded from `workerloop.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Settings shared by every worker
    #[serde(default)]
    pub defaults: RunSettings,
    /// Per-worker settings, keyed by worker name
    #[serde(default)]
    pub workers: BTreeMap<String, RunSettings>,
}

/// Stop conditions and pacing of a run. `None` means "not set here".
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    /// Seconds between iterations
    pub sleep: Option<f64>,
    /// Human readable byte size, e.g. "128m"
    #[serde(alias = "memory-limit")]
    pub memory_limit: Option<String>,
    /// Seconds
    #[serde(alias = "time-limit")]
    pub time_limit: Option<u64>,
}

impl RunSettings {
    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: RunSettings) -> RunSettings {
        RunSettings {
            sleep: self.sleep.or(fallback.sleep),
            memory_limit: self.memory_limit.or(fallback.memory_limit),
            time_limit: self.time_limit.or(fallback.time_limit),
        }
    }
}

impl WorkerConfig {
    /// Load configuration for a working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file exists and parses successfully
    /// - `Ok(None)` if neither file exists
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let candidates = [Some(working_dir.join(CONFIG_FILE_NAME)), user_config_path()];

        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load_from(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: WorkerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Effective settings of a worker.
    /// Priority: [workers.<name>] > [defaults]
    pub fn settings_for(&self, worker: &str) -> RunSettings {
        let specific = self.workers.get(worker).cloned().unwrap_or_default();
        specific.or(self.defaults.clone())
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("workerloop").join("config.toml"))
}
