use super::state::{ConfigPatch, SessionConfig};

/// Single source of truth for the session configuration.
///
/// Pure data: no I/O and no validation, callers hand in values that are
/// already known to be valid.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: SessionConfig,
}

impl ConfigStore {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn get(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set(&mut self, patch: ConfigPatch) -> &SessionConfig {
        self.config.apply(patch);
        &self.config
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
