//! Bus configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;

/// Default initial capacity of the dispatch cache (distinct concrete types).
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Configuration for a [`SimpleEventBus`](crate::SimpleEventBus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Label attached to every log record the bus emits.
    pub name: String,

    /// Capture handler panics as failures instead of unwinding through `post`.
    pub catch_panics: bool,

    /// Log each captured subscriber failure at `warn` level.
    pub log_failures: bool,

    /// Initial capacity of the concrete-type dispatch cache.
    pub cache_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: "event-bus".to_string(),
            catch_panics: true,
            log_failures: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl BusConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RELAY_BUS_NAME`: Bus label (default: event-bus)
    /// - `RELAY_CATCH_PANICS`: Capture handler panics (default: true)
    /// - `RELAY_LOG_FAILURES`: Log captured failures (default: true)
    /// - `RELAY_CACHE_CAPACITY`: Initial dispatch cache capacity (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            name: env::var("RELAY_BUS_NAME").unwrap_or(defaults.name),

            catch_panics: env::var("RELAY_CATCH_PANICS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.catch_panics),

            log_failures: env::var("RELAY_LOG_FAILURES")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.log_failures),

            cache_capacity: match env::var("RELAY_CACHE_CAPACITY") {
                Ok(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "RELAY_CACHE_CAPACITY",
                    value,
                })?,
                Err(_) => defaults.cache_capacity,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }

    /// Builder-style method to set the bus label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style method to toggle panic capture
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Builder-style method to toggle failure logging
    pub fn with_log_failures(mut self, log: bool) -> Self {
        self.log_failures = log;
        self
    }

    /// Builder-style method to set the cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
