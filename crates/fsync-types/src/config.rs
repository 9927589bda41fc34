//! Configuration types for fsync
//!
//! This module provides type-safe configuration structures with validation
//! and optional serialization support. Everything here is a plain value: the
//! differ and the copy pool receive these by value and never mutate them.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Buffer size configuration with validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferSize(usize);

impl BufferSize {
    /// Minimum buffer size (4KB)
    pub const MIN: usize = 4 * 1024;
    /// Maximum buffer size (64MB)
    pub const MAX: usize = 64 * 1024 * 1024;
    /// Default buffer size (4MB)
    pub const DEFAULT: usize = 4 * 1024 * 1024;

    /// Create a new buffer size with validation
    pub fn new(size: usize) -> std::result::Result<Self, String> {
        if size < Self::MIN {
            Err(format!("Buffer size {} is below minimum {}", size, Self::MIN))
        } else if size > Self::MAX {
            Err(format!("Buffer size {} exceeds maximum {}", size, Self::MAX))
        } else if !size.is_power_of_two() {
            Err(format!("Buffer size {} must be a power of two", size))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the buffer size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Number of copy workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerCount(usize);

impl WorkerCount {
    /// Minimum worker count
    pub const MIN: usize = 1;
    /// Maximum worker count
    pub const MAX: usize = 256;

    /// Create a new worker count with validation
    pub fn new(count: usize) -> std::result::Result<Self, String> {
        if count < Self::MIN {
            Err(format!("Worker count {} is below minimum {}", count, Self::MIN))
        } else if count > Self::MAX {
            Err(format!("Worker count {} exceeds maximum {}", count, Self::MAX))
        } else {
            Ok(Self(count))
        }
    }

    /// Get the worker count value
    pub fn get(self) -> usize {
        self.0
    }

    /// One worker per available processor
    pub fn optimal() -> Self {
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self(cpu_count.clamp(Self::MIN, Self::MAX))
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::optimal()
    }
}

/// Fixed-delay retry policy used when a file is locked by another process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Total number of open attempts, including the first one
    pub max_attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts
    pub const DEFAULT_ATTEMPTS: u32 = 100;
    /// Default pause between attempts
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

    /// Create a new retry policy
    pub fn new(max_attempts: u32, delay: Duration) -> std::result::Result<Self, String> {
        if max_attempts == 0 {
            return Err("Retry policy needs at least one attempt".to_string());
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    /// Worst-case time spent waiting before giving up
    pub fn worst_case_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_ATTEMPTS,
            delay: Self::DEFAULT_DELAY,
        }
    }
}

/// Digest used to compare file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HashAlgorithm {
    /// 128-bit XXH3
    #[default]
    Xxh3,
    /// BLAKE3 (256-bit)
    Blake3,
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Self::Xxh3 => "xxh3",
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }

    /// Digest width in bytes
    pub fn digest_len(self) -> usize {
        match self {
            Self::Xxh3 => 16,
            Self::Blake3 | Self::Sha256 => 32,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xxh3" | "xxh3-128" | "xxh128" => Ok(Self::Xxh3),
            "blake3" => Ok(Self::Blake3),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(Error::config(format!(
                "Unknown hash algorithm '{}' (expected one of: xxh3, blake3, sha256)",
                other
            ))),
        }
    }
}

/// How file and directory names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchCasing {
    /// Case-insensitive, the historical behavior on every platform
    #[default]
    PlatformDefault,
    /// Names must match byte for byte
    CaseSensitive,
    /// Names match ignoring case
    CaseInsensitive,
}

impl MatchCasing {
    /// Whether names compare without regard to case
    pub fn ignores_case(self) -> bool {
        !matches!(self, Self::CaseSensitive)
    }
}

/// Which directory entries the traversal sees
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnumerationConfig {
    /// Descend into subdirectories
    pub recurse_subdirectories: bool,
    /// Include hidden entries
    pub include_hidden: bool,
    /// Include entries flagged as system files
    pub include_system: bool,
    /// Include sparse files
    pub include_sparse: bool,
    /// Include encrypted files
    pub include_encrypted: bool,
    /// List `.` and `..` among subdirectories
    pub include_special_directories: bool,
    /// Treat unreadable directories as empty instead of failing
    pub ignore_inaccessible: bool,
    /// Name comparison mode
    pub match_casing: MatchCasing,
    /// Wildcard applied to file names (`*` and `?`)
    pub wildcard: String,
}

impl EnumerationConfig {
    /// Wildcard matching every file
    pub const MATCH_ALL: &'static str = "*";

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.wildcard.is_empty() {
            return Err(Error::config("Wildcard must not be empty"));
        }
        Ok(())
    }
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            recurse_subdirectories: false,
            include_hidden: false,
            include_system: false,
            include_sparse: false,
            include_encrypted: false,
            include_special_directories: false,
            ignore_inaccessible: false,
            match_casing: MatchCasing::PlatformDefault,
            wildcard: Self::MATCH_ALL.to_string(),
        }
    }
}

/// How two same-named files are compared
///
/// With both flags off (the default) two files with the same name are always
/// reported as unchanged, whatever their contents. Enable `use_hash` or
/// `use_size` to detect content changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComparisonConfig {
    /// Compare full-content digests
    pub use_hash: bool,
    /// Compare byte lengths
    pub use_size: bool,
    /// Explicit digest; only allowed together with `use_hash`
    pub hash_algorithm: Option<HashAlgorithm>,
}

impl ComparisonConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hash_algorithm.is_some() && !self.use_hash {
            return Err(Error::config(
                "No hash algorithm should be specified when hashing is disabled",
            ));
        }
        Ok(())
    }

    /// Digest to use when hashing is enabled
    pub fn effective_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm.unwrap_or_default()
    }

    /// Whether any content comparison is performed at all
    pub fn compares_content(&self) -> bool {
        self.use_hash || self.use_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("xxh3", HashAlgorithm::Xxh3)]
    #[case("XXH3-128", HashAlgorithm::Xxh3)]
    #[case("blake3", HashAlgorithm::Blake3)]
    #[case(" Sha256 ", HashAlgorithm::Sha256)]
    #[case("sha-256", HashAlgorithm::Sha256)]
    fn test_hash_algorithm_parse(#[case] name: &str, #[case] expected: HashAlgorithm) {
        assert_eq!(name.parse::<HashAlgorithm>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_hash_algorithm_is_config_error() {
        let err = "md4".parse::<HashAlgorithm>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }

    #[test]
    fn test_algorithm_without_hashing_is_rejected() {
        let config = ComparisonConfig {
            use_hash: false,
            use_size: true,
            hash_algorithm: Some(HashAlgorithm::Sha256),
        };
        assert!(config.validate().is_err());

        let config = ComparisonConfig {
            use_hash: true,
            ..config
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_algorithm(), HashAlgorithm::Sha256);
    }

    #[test]
    fn test_default_comparison_compares_nothing() {
        let config = ComparisonConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.compares_content());
        assert_eq!(config.effective_algorithm(), HashAlgorithm::Xxh3);
    }

    #[test]
    fn test_enumeration_defaults() {
        let config = EnumerationConfig::default();
        assert!(!config.recurse_subdirectories);
        assert!(!config.include_hidden);
        assert_eq!(config.wildcard, "*");
        assert!(config.match_casing.ignores_case());
        assert!(config.validate().is_ok());

        let empty = EnumerationConfig {
            wildcard: String::new(),
            ..EnumerationConfig::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_buffer_size_validation() {
        assert!(BufferSize::new(4096).is_ok());
        assert!(BufferSize::new(1024).is_err());
        assert!(BufferSize::new(5000).is_err());
        assert_eq!(BufferSize::default().get(), 4 * 1024 * 1024);
    }

    #[test]
    fn test_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 100);
        assert_eq!(policy.worst_case_wait(), Duration::from_millis(9_900));
        assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
    }

    #[test]
    fn test_worker_count_bounds() {
        assert!(WorkerCount::new(0).is_err());
        assert!(WorkerCount::new(257).is_err());
        assert!(WorkerCount::optimal().get() >= 1);
    }
}
