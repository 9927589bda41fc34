//! Pairwise file comparison

use crate::hash::{hash_file, HASH_CHUNK_SIZE};
use fsync_types::{ComparisonConfig, FileDifference, FileEntry, HashAlgorithm, Result};
use std::cmp::Ordering;
use tracing::trace;

/// Decides whether two same-named files differ and which one is newer
#[derive(Debug, Clone)]
pub struct FileComparator {
    config: ComparisonConfig,
    algorithm: HashAlgorithm,
}

impl FileComparator {
    /// Create a comparator, rejecting inconsistent configurations
    pub fn new(config: ComparisonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            algorithm: config.effective_algorithm(),
            config,
        })
    }

    /// Comparison settings in use
    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Order `a` against `b`
    ///
    /// `Equal` means unchanged. Otherwise the result is the order of the
    /// last-modified times, so `Greater` means `a` is the newer file. Changed
    /// files with identical timestamps compare `Equal`.
    pub fn compare(&self, a: &FileEntry, b: &FileEntry) -> Result<Ordering> {
        if self.contents_match(a, b)? {
            return Ok(Ordering::Equal);
        }
        Ok(a.modified.cmp(&b.modified))
    }

    /// Classify a same-named pair as modified or unchanged
    pub fn classify(&self, a: FileEntry, b: FileEntry) -> Result<FileDifference> {
        Ok(match self.compare(&a, &b)? {
            Ordering::Greater => FileDifference::modified(a, b),
            Ordering::Less => FileDifference::modified(b, a),
            Ordering::Equal => FileDifference::unchanged(a, b),
        })
    }

    fn contents_match(&self, a: &FileEntry, b: &FileEntry) -> Result<bool> {
        if self.config.use_size && a.len != b.len {
            trace!("Size differs: {} vs {}", a.path.display(), b.path.display());
            return Ok(false);
        }

        if self.config.use_hash {
            let mut buffer = vec![0u8; HASH_CHUNK_SIZE];
            let left = hash_file(&a.path, self.algorithm, &mut buffer)?;
            let right = hash_file(&b.path, self.algorithm, &mut buffer)?;
            if left != right {
                trace!(
                    "{} digest differs: {} vs {}",
                    self.algorithm,
                    a.path.display(),
                    b.path.display()
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}
