//! Result type alias for fsync operations

use crate::Error;

/// Result type alias for fsync operations
pub type Result<T> = std::result::Result<T, Error>;
