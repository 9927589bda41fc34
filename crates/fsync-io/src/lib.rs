//! Concurrent file copy engine for fsync
//!
//! This crate executes the copy side of a synchronization run:
//!
//! - **Chunked copy**: stream a source file into a destination through a
//!   fixed-size buffer
//! - **Lock-aware open**: wait out sharing violations with a bounded,
//!   fixed-delay retry
//! - **Worker pool**: a fixed set of threads, capped at the processor count,
//!   draining a shared queue with per-item failure isolation
//!
//! # Examples
//!
//! ```rust,no_run
//! use fsync_io::CopyWorkerPool;
//!
//! # fn example() -> fsync_types::Result<()> {
//! let mut pool = CopyWorkerPool::new()?;
//! pool.enqueue("a/report.txt", "b/report.txt")?;
//! pool.dispose();
//! println!("{} files copied", pool.stats().files_copied);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod copy;
pub mod pool;

pub use copy::{copy_file, copy_stream, is_sharing_violation, open_read_with_retry, CopyOptions};
pub use pool::{CopyFailure, CopyWorkItem, CopyWorkerPool, PoolConfig};
