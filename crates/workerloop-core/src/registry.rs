use std::collections::BTreeMap;

use crate::error::WorkerError;
use crate::worker::WorkUnit;

/// Work units available for selection by name.
///
/// Built explicitly by the application at startup. Registering a second unit
/// under an existing name replaces the first one.
#[derive(Default)]
pub struct WorkerRegistry {
    units: BTreeMap<String, Box<dyn WorkUnit>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, unit: impl WorkUnit + 'static) -> &mut Self {
        self.units.insert(unit.name().to_string(), Box::new(unit));
        self
    }

    pub fn with(mut self, unit: impl WorkUnit + 'static) -> Self {
        self.register(unit);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    /// Remove the unit so a worker can own it.
    pub fn take(&mut self, name: &str) -> Result<Box<dyn WorkUnit>, WorkerError> {
        self.units
            .remove(name)
            .ok_or_else(|| WorkerError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
