//! Synchronization run: diff two trees and apply the differences

use fsync_diff::{DirectoryTreeDiffer, SyncRequest};
use fsync_io::{CopyFailure, CopyWorkerPool, PoolConfig};
use fsync_types::{CopyStats, DifferenceKind, Error, FileDifference, FileEntry, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How differences are acted upon
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Report differences without touching either tree
    pub simulate: bool,
    /// Remove files that only exist in the second tree
    pub delete: bool,
    /// Copy pool settings
    pub pool: PoolConfig,
}

/// Number of differences seen per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifferenceCounts {
    /// Unchanged pairs
    pub unchanged: u64,
    /// Files only in the first tree
    pub created: u64,
    /// Files only in the second tree
    pub deleted: u64,
    /// Changed pairs
    pub modified: u64,
}

impl DifferenceCounts {
    /// Count one difference
    pub fn record(&mut self, kind: DifferenceKind) {
        match kind {
            DifferenceKind::None => self.unchanged += 1,
            DifferenceKind::Created => self.created += 1,
            DifferenceKind::Deleted => self.deleted += 1,
            DifferenceKind::Modified => self.modified += 1,
        }
    }

    /// Differences that are actual changes
    pub fn changes(&self) -> u64 {
        self.created + self.deleted + self.modified
    }

    /// Every difference seen
    pub fn total(&self) -> u64 {
        self.changes() + self.unchanged
    }
}

/// Outcome of a synchronization run
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Request ID for tracking
    pub request_id: uuid::Uuid,
    /// Authoritative directory
    pub first: PathBuf,
    /// Directory brought in line
    pub second: PathBuf,
    /// Whether the run only reported differences
    pub simulated: bool,
    /// Differences per kind
    pub counts: DifferenceCounts,
    /// Copy, delete and directory statistics
    pub stats: CopyStats,
    /// Copies that did not complete
    pub copy_failures: Vec<CopyFailure>,
    /// Enumeration and apply errors, rendered
    pub errors: Vec<String>,
    /// Wall-clock time of the whole run
    pub duration: Duration,
}

impl SyncReport {
    /// Whether everything was enumerated and applied
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.copy_failures.is_empty()
    }
}

/// Brings a second directory tree in line with a first one
#[derive(Debug, Clone)]
pub struct Synchronizer {
    request: SyncRequest,
    options: SyncOptions,
}

impl Synchronizer {
    /// Create a synchronizer, rejecting invalid requests
    pub fn new(request: SyncRequest, options: SyncOptions) -> Result<Self> {
        request.validate()?;
        Ok(Self { request, options })
    }

    /// The resolved request
    pub fn request(&self) -> &SyncRequest {
        &self.request
    }

    /// Run to completion
    pub fn run(&self) -> Result<SyncReport> {
        self.run_with(|_| {})
    }

    /// Run to completion, calling `observer` for every difference found
    ///
    /// Setup failures are returned as errors. Failures met while walking or
    /// applying are collected in the report and the run carries on.
    pub fn run_with<F>(&self, mut observer: F) -> Result<SyncReport>
    where
        F: FnMut(&FileDifference),
    {
        let started = Instant::now();
        let first = &self.request.first;
        let second = &self.request.second;

        info!(
            "Starting sync {}: {} -> {}",
            self.request.request_id,
            first.display(),
            second.display()
        );
        bootstrap(first)?;
        bootstrap(second)?;

        let differ = DirectoryTreeDiffer::from_request(&self.request)?;
        let mut pool = CopyWorkerPool::with_config(self.options.pool)?;

        let mut counts = DifferenceCounts::default();
        let mut stats = CopyStats::new();
        let mut errors = Vec::new();

        for item in differ.differences() {
            let difference = match item {
                Ok(difference) => difference,
                Err(e) => {
                    error!("{}", e);
                    errors.push(e.to_string());
                    continue;
                }
            };

            counts.record(difference.kind());
            log_difference(&difference);

            if !self.options.simulate {
                if let Err(e) = self.apply(&pool, &difference, &mut stats) {
                    error!(
                        "Failed to apply {} on '{}': {}",
                        difference.kind(),
                        difference.relative_path().display(),
                        e
                    );
                    stats.errors += 1;
                    errors.push(e.to_string());
                }
            }

            observer(&difference);
        }

        pool.dispose();
        stats.merge(&pool.stats());
        let copy_failures = pool.failures();
        let duration = started.elapsed();

        info!(
            "Sync {} finished: {} differences, {} changes in {:?}",
            self.request.request_id,
            counts.total(),
            counts.changes(),
            duration
        );

        Ok(SyncReport {
            request_id: self.request.request_id,
            first: first.clone(),
            second: second.clone(),
            simulated: self.options.simulate,
            counts,
            stats,
            copy_failures,
            errors,
            duration,
        })
    }

    fn apply(
        &self,
        pool: &CopyWorkerPool,
        difference: &FileDifference,
        stats: &mut CopyStats,
    ) -> Result<()> {
        match (difference.kind(), difference.source(), difference.target()) {
            (DifferenceKind::Created, Some(source), _) => {
                let destination = self.request.second.join(&source.relative_path);
                if let Some(parent) = destination.parent() {
                    if !parent.is_dir() {
                        fs::create_dir_all(parent).map_err(|e| Error::io_at(parent, &e))?;
                        stats.directories_created += 1;
                    }
                }
                pool.enqueue(source.path.clone(), destination)
            }
            (DifferenceKind::Modified, Some(source), Some(target)) => {
                pool.enqueue(source.path.clone(), target.path.clone())
            }
            (DifferenceKind::Deleted, _, Some(target)) => {
                if self.options.delete {
                    fs::remove_file(&target.path).map_err(|e| Error::io_at(&target.path, &e))?;
                    debug!("Deleted {}", target.path.display());
                    stats.files_deleted += 1;
                } else {
                    stats.files_skipped += 1;
                }
                Ok(())
            }
            (DifferenceKind::None, ..) => Ok(()),
            (kind, ..) => Err(Error::internal(format!(
                "{} difference without the expected sides",
                kind
            ))),
        }
    }
}

fn bootstrap(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io_at(dir, &e))
}

fn log_difference(difference: &FileDifference) {
    let target = side(difference.target());
    let source = side(difference.source());
    if difference.is_change() {
        info!("[{}] {} --> {}", difference.kind(), target, source);
    } else {
        debug!("[{}] {} --> {}", difference.kind(), target, source);
    }
}

fn side(entry: Option<&FileEntry>) -> String {
    entry.map_or_else(String::new, |e| e.path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsync_types::{ComparisonConfig, EnumerationConfig, WorkerCount};
    use tempfile::TempDir;

    fn options(simulate: bool, delete: bool) -> SyncOptions {
        SyncOptions {
            simulate,
            delete,
            pool: PoolConfig {
                workers: Some(WorkerCount::new(2).unwrap()),
                drain_poll_interval: Duration::from_millis(1),
                ..PoolConfig::default()
            },
        }
    }

    fn request(root: &Path) -> SyncRequest {
        SyncRequest::new(root.join("a"), root.join("b"))
            .with_enumeration(EnumerationConfig {
                recurse_subdirectories: true,
                ..EnumerationConfig::default()
            })
            .with_comparison(ComparisonConfig {
                use_size: true,
                ..ComparisonConfig::default()
            })
    }

    #[test]
    fn test_counts() {
        let mut counts = DifferenceCounts::default();
        counts.record(DifferenceKind::Created);
        counts.record(DifferenceKind::None);
        counts.record(DifferenceKind::Modified);
        assert_eq!(counts.changes(), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_bootstrap_creates_roots() {
        let temp_dir = TempDir::new().unwrap();
        let report = Synchronizer::new(request(temp_dir.path()), options(false, false))
            .unwrap()
            .run()
            .unwrap();

        assert!(temp_dir.path().join("a").is_dir());
        assert!(temp_dir.path().join("b").is_dir());
        assert_eq!(report.counts.total(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_created_file_lands_in_new_parent() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("x").join("y");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("deep.txt"), b"deep").unwrap();

        let report = Synchronizer::new(request(temp_dir.path()), options(false, false))
            .unwrap()
            .run()
            .unwrap();

        let copied = temp_dir.path().join("b").join("x").join("y").join("deep.txt");
        assert_eq!(fs::read(copied).unwrap(), b"deep");
        assert_eq!(report.counts.created, 1);
        assert_eq!(report.stats.files_copied, 1);
        assert_eq!(report.stats.directories_created, 1);
    }

    #[test]
    fn test_simulate_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a")).unwrap();
        fs::write(temp_dir.path().join("a").join("new.txt"), b"n").unwrap();

        let mut seen = Vec::new();
        let report = Synchronizer::new(request(temp_dir.path()), options(true, false))
            .unwrap()
            .run_with(|d| seen.push(d.kind()))
            .unwrap();

        assert_eq!(seen, vec![DifferenceKind::Created]);
        assert!(report.simulated);
        assert!(!temp_dir.path().join("b").join("new.txt").exists());
        assert_eq!(report.stats.files_copied, 0);
    }

    #[test]
    fn test_deleted_kept_unless_requested() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();
        let extra = temp_dir.path().join("b").join("extra.txt");
        fs::write(&extra, b"e").unwrap();

        let kept = Synchronizer::new(request(temp_dir.path()), options(false, false))
            .unwrap()
            .run()
            .unwrap();
        assert!(extra.exists());
        assert_eq!(kept.stats.files_skipped, 1);

        let removed = Synchronizer::new(request(temp_dir.path()), options(false, true))
            .unwrap()
            .run()
            .unwrap();
        assert!(!extra.exists());
        assert_eq!(removed.stats.files_deleted, 1);
    }

    #[test]
    fn test_invalid_request_rejected() {
        let result = Synchronizer::new(SyncRequest::new("", "b"), SyncOptions::default());
        assert!(result.is_err());
    }
}
