//! fsync integration test suite
//!
//! Shared fixture helpers live in [`test_utils`]; the end-to-end scenarios
//! are under `tests/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Builders for pairs of directory trees with controlled contents and
/// modification times.
pub mod test_utils;
