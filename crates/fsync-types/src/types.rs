//! Core data types for fsync
//!
//! Observed files, difference records and copy statistics shared by the
//! differ, the copy pool and the command line front end.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A regular file observed in one of the two trees
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileEntry {
    /// Full path of the file
    pub path: PathBuf,
    /// Path relative to the root of the tree it was found in
    pub relative_path: PathBuf,
    /// Length in bytes
    pub len: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl FileEntry {
    /// Build an entry from already fetched metadata
    pub fn from_metadata(path: PathBuf, relative_path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Self {
            path,
            relative_path,
            len: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
        }
    }

    /// Stat `path` and build an entry for it
    pub fn from_path(path: &Path, relative_path: PathBuf) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| Error::io_at(path, &e))?;
        Ok(Self::from_metadata(path.to_path_buf(), relative_path, &metadata))
    }

    /// File name component
    pub fn file_name(&self) -> &std::ffi::OsStr {
        self.path.file_name().unwrap_or(self.path.as_os_str())
    }
}

/// Classification of one matched or unmatched file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DifferenceKind {
    /// Present on both sides and considered equal
    None,
    /// Present only in the first tree
    Created,
    /// Present only in the second tree
    Deleted,
    /// Present on both sides with different contents
    Modified,
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Created => "Created",
            Self::Deleted => "Deleted",
            Self::Modified => "Modified",
        };
        f.write_str(name)
    }
}

/// One record of the tree difference
///
/// Only the constructors below can build a value, so the pairing of `kind`
/// with the populated sides always holds:
/// `Created` has a source only, `Deleted` a target only, `Modified` and
/// `None` have both. For `Modified` the source is the newer file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FileDifference {
    kind: DifferenceKind,
    source: Option<FileEntry>,
    target: Option<FileEntry>,
}

impl FileDifference {
    /// A file that only exists in the first tree
    pub fn created(source: FileEntry) -> Self {
        Self {
            kind: DifferenceKind::Created,
            source: Some(source),
            target: None,
        }
    }

    /// A file that only exists in the second tree
    pub fn deleted(target: FileEntry) -> Self {
        Self {
            kind: DifferenceKind::Deleted,
            source: None,
            target: Some(target),
        }
    }

    /// A changed pair, `newer` becoming the source
    pub fn modified(newer: FileEntry, older: FileEntry) -> Self {
        Self {
            kind: DifferenceKind::Modified,
            source: Some(newer),
            target: Some(older),
        }
    }

    /// An unchanged pair
    pub fn unchanged(first: FileEntry, second: FileEntry) -> Self {
        Self {
            kind: DifferenceKind::None,
            source: Some(first),
            target: Some(second),
        }
    }

    /// Difference classification
    pub fn kind(&self) -> DifferenceKind {
        self.kind
    }

    /// Authoritative side, if any
    pub fn source(&self) -> Option<&FileEntry> {
        self.source.as_ref()
    }

    /// Side to be replaced or removed, if any
    pub fn target(&self) -> Option<&FileEntry> {
        self.target.as_ref()
    }

    /// Relative path shared by both sides
    pub fn relative_path(&self) -> &Path {
        self.source
            .as_ref()
            .or(self.target.as_ref())
            .map(|entry| entry.relative_path.as_path())
            .unwrap_or_else(|| Path::new(""))
    }

    /// Whether applying this record changes anything
    pub fn is_change(&self) -> bool {
        self.kind != DifferenceKind::None
    }
}

/// File copy statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CopyStats {
    /// Number of files copied
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of differences left untouched
    pub files_skipped: u64,
    /// Number of files removed from the second tree
    pub files_deleted: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Number of errors encountered
    pub errors: u64,
    /// Total duration of the operation
    pub duration: Duration,
}

impl CopyStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the overall transfer rate in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &CopyStats) {
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.files_skipped += other.files_skipped;
        self.files_deleted += other.files_deleted;
        self.directories_created += other.directories_created;
        self.errors += other.errors;
        self.duration += other.duration;
    }
}
