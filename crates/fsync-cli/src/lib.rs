//! Directory synchronization front end for fsync
//!
//! The binary parses flags and settings into a [`fsync_diff::SyncRequest`];
//! this library runs it:
//!
//! - [`sync`]: walk both trees, apply each difference, collect a report
//! - [`display`]: styled console output
//! - [`json_output`]: machine-readable report

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod display;
pub mod json_output;
pub mod sync;

pub use sync::{DifferenceCounts, SyncOptions, SyncReport, Synchronizer};
