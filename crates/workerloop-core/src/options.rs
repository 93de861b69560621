use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

pub const SLEEP: &str = "sleep";
pub const MEMORY_LIMIT: &str = "memory-limit";
pub const TIME_LIMIT: &str = "time-limit";

/// Option name to value mapping handed to observers and work units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunOptions {
    values: BTreeMap<String, Value>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the options of one run.
    /// Priority: overrides > worker defaults > `sleep = 0`
    pub fn resolve(worker_defaults: &RunOptions, overrides: &RunOptions) -> Self {
        Self::new()
            .with(SLEEP, 0)
            .merge(worker_defaults)
            .merge(overrides)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Overlay `other` on top of `self`, key by key.
    pub fn merge(mut self, other: &RunOptions) -> Self {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Numbers are read as is, numeric strings are parsed.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Delay between two successful iterations. Missing, negative,
    /// non-numeric or unrepresentable values mean no delay.
    pub fn sleep(&self) -> Duration {
        self.get_f64(SLEEP)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(Duration::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
