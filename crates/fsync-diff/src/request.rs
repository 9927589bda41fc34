//! Resolved synchronization request

use fsync_types::{ComparisonConfig, EnumerationConfig, Error, Result};
use std::path::{Path, PathBuf};

/// Everything a synchronization run needs to know
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Authoritative directory
    pub first: PathBuf,
    /// Directory brought in line with `first`
    pub second: PathBuf,
    /// Which entries are visited
    pub enumeration: EnumerationConfig,
    /// How same-named files are compared
    pub comparison: ComparisonConfig,
    /// Request ID for tracking
    pub request_id: uuid::Uuid,
}

impl SyncRequest {
    /// Create a new sync request with default settings
    pub fn new<P: AsRef<Path>>(first: P, second: P) -> Self {
        Self {
            first: first.as_ref().to_path_buf(),
            second: second.as_ref().to_path_buf(),
            enumeration: EnumerationConfig::default(),
            comparison: ComparisonConfig::default(),
            request_id: uuid::Uuid::new_v4(),
        }
    }

    /// Set enumeration options
    pub fn with_enumeration(mut self, enumeration: EnumerationConfig) -> Self {
        self.enumeration = enumeration;
        self
    }

    /// Set comparison options
    pub fn with_comparison(mut self, comparison: ComparisonConfig) -> Self {
        self.comparison = comparison;
        self
    }

    /// Reject requests that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.first.as_os_str().is_empty() || self.second.as_os_str().is_empty() {
            return Err(Error::config("Both directories are required"));
        }
        self.enumeration.validate()?;
        self.comparison.validate()
    }
}
