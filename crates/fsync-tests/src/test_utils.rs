//! Fixture helpers for fsync tests

use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Base modification time used by fixtures (2023-11-14T22:13:20Z)
pub const BASE_MTIME: i64 = 1_700_000_000;

/// Two sibling directories, `first` and `second`, inside a temp dir
pub struct TreePair {
    temp_dir: TempDir,
}

impl TreePair {
    /// Create both directories, empty
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("first")).expect("Failed to create first");
        fs::create_dir_all(temp_dir.path().join("second")).expect("Failed to create second");
        Self { temp_dir }
    }

    /// Root of the temp dir
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Authoritative tree
    pub fn first(&self) -> PathBuf {
        self.root().join("first")
    }

    /// Tree to bring in line
    pub fn second(&self) -> PathBuf {
        self.root().join("second")
    }

    /// Write a file into the first tree, modified `age_secs` before [`BASE_MTIME`]
    pub fn write_first(&self, relative: &str, content: &[u8], age_secs: i64) -> PathBuf {
        write_file(&self.first(), relative, content, age_secs)
    }

    /// Write a file into the second tree, modified `age_secs` before [`BASE_MTIME`]
    pub fn write_second(&self, relative: &str, content: &[u8], age_secs: i64) -> PathBuf {
        write_file(&self.second(), relative, content, age_secs)
    }

    /// Read a file from the second tree
    pub fn read_second(&self, relative: &str) -> Option<Vec<u8>> {
        fs::read(self.second().join(relative)).ok()
    }
}

impl Default for TreePair {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `content` to `root/relative`, creating parents, and pin its mtime
pub fn write_file(root: &Path, relative: &str, content: &[u8], age_secs: i64) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent");
    }
    fs::write(&path, content).expect("Failed to write file");
    set_age(&path, age_secs);
    path
}

/// Pin the modification time of `path` to `age_secs` before [`BASE_MTIME`]
pub fn set_age(path: &Path, age_secs: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(BASE_MTIME - age_secs, 0))
        .expect("Failed to set mtime");
}

/// Deterministic content of `size` bytes
pub fn patterned_content(size: usize, seed: u8) -> Vec<u8> {
    (0..size)
        .map(|i| ((i * 7 + 13) % 256) as u8 ^ seed)
        .collect()
}

/// Relative paths of every regular file under `root`, sorted
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("Failed to read dir") {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    files.sort();
    files
}
