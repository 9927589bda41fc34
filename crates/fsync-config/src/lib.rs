//! Configuration management for fsync
//!
//! Settings are layered: built-in defaults, then an optional YAML, TOML or
//! JSON file, then `FSYNC__*` environment variables. Command-line flags are
//! applied on top by the binary.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fsync_config::{ConfigBuilder, Settings};
//!
//! let settings: Settings = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("fsync.yaml")
//!     .add_env_prefix("FSYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Wildcard: {}", settings.enumeration.wildcard);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use fsync_types::{
    BufferSize, ComparisonConfig, EnumerationConfig, RetryPolicy, WorkerCount,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FSYNC";

/// Main configuration structure for fsync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which entries are visited
    pub enumeration: EnumerationConfig,
    /// How same-named files are compared
    pub comparison: ComparisonConfig,
    /// Copy pool sizing and retry behavior
    pub pool: PoolSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Copy pool settings, in plain units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Worker threads; one per processor when unset
    pub workers: Option<usize>,
    /// Copy chunk size in bytes
    pub buffer_size: usize,
    /// Attempts at opening a locked source
    pub retry_attempts: u32,
    /// Pause between two attempts, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            workers: None,
            buffer_size: BufferSize::DEFAULT,
            retry_attempts: RetryPolicy::DEFAULT_ATTEMPTS,
            retry_delay_ms: 100,
        }
    }
}

impl PoolSettings {
    /// Validated worker count, if one was requested
    pub fn worker_count(&self) -> ConfigResult<Option<WorkerCount>> {
        self.workers
            .map(|n| WorkerCount::new(n).map_err(|e| ConfigError::invalid_value("pool.workers", e)))
            .transpose()
    }

    /// Validated copy chunk size
    pub fn buffer_size(&self) -> ConfigResult<BufferSize> {
        BufferSize::new(self.buffer_size)
            .map_err(|e| ConfigError::invalid_value("pool.buffer_size", e))
    }

    /// Validated retry policy
    pub fn retry_policy(&self) -> ConfigResult<RetryPolicy> {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
            .map_err(|e| ConfigError::invalid_value("pool.retry_attempts", e))
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}

impl LoggingConfig {
    /// Accepted level names
    pub const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.enumeration.wildcard, "*");
        assert!(!settings.comparison.use_hash);
        assert_eq!(settings.pool.worker_count().unwrap(), None);
        assert_eq!(settings.pool.buffer_size().unwrap().get(), BufferSize::DEFAULT);
        assert_eq!(
            settings.pool.retry_policy().unwrap(),
            RetryPolicy::default()
        );
    }

    #[test]
    fn test_invalid_pool_values() {
        let pool = PoolSettings {
            workers: Some(0),
            buffer_size: 1000,
            ..PoolSettings::default()
        };
        assert!(pool.worker_count().is_err());
        assert!(pool.buffer_size().is_err());
    }
}
