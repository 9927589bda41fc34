//! Core type system and error handling for fsync
//!
//! This crate provides the foundational types shared by every fsync crate:
//!
//! - **Error handling**: one [`Error`] enum with kinds and severity levels
//! - **Core types**: observed files, difference records and copy statistics
//! - **Configuration**: validated enumeration, comparison and retry settings
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use fsync_types::{ComparisonConfig, HashAlgorithm, Result};
//!
//! fn hashed() -> Result<ComparisonConfig> {
//!     let config = ComparisonConfig {
//!         use_hash: true,
//!         use_size: false,
//!         hash_algorithm: Some("blake3".parse::<HashAlgorithm>()?),
//!     };
//!     config.validate()?;
//!     Ok(config)
//! }
//! # hashed().unwrap();
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{
    BufferSize, ComparisonConfig, EnumerationConfig, HashAlgorithm, MatchCasing, RetryPolicy,
    WorkerCount,
};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use types::*;
