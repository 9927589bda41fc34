//! Name comparers for file and directory entries

use crate::partition::KeyComparer;
use fsync_types::{FileEntry, MatchCasing};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Anything with a name a [`NameComparer`] can look at
pub trait EntryName {
    /// Name compared; empty when there is none
    fn entry_name(&self) -> &OsStr;
}

impl EntryName for Path {
    fn entry_name(&self) -> &OsStr {
        self.file_name().unwrap_or_default()
    }
}

impl EntryName for PathBuf {
    fn entry_name(&self) -> &OsStr {
        self.as_path().entry_name()
    }
}

impl<T: EntryName + ?Sized> EntryName for &T {
    fn entry_name(&self) -> &OsStr {
        (**self).entry_name()
    }
}

impl EntryName for FileEntry {
    fn entry_name(&self) -> &OsStr {
        self.file_name()
    }
}

/// Compares entries by their final path component
///
/// Case folding applies to names that are valid Unicode; other names always
/// compare byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameComparer {
    ignore_case: bool,
}

/// File names, ignoring case
pub const FILE_NAME_IGNORE_CASE: NameComparer = NameComparer::new(true);
/// File names, exact
pub const FILE_NAME_MATCH_CASE: NameComparer = NameComparer::new(false);
/// Directory names, ignoring case
pub const DIRECTORY_NAME_IGNORE_CASE: NameComparer = NameComparer::new(true);
/// Directory names, exact
pub const DIRECTORY_NAME_MATCH_CASE: NameComparer = NameComparer::new(false);

impl NameComparer {
    /// Build a comparer
    pub const fn new(ignore_case: bool) -> Self {
        Self { ignore_case }
    }

    /// File name comparer for a casing mode
    pub fn files(casing: MatchCasing) -> Self {
        if casing.ignores_case() {
            FILE_NAME_IGNORE_CASE
        } else {
            FILE_NAME_MATCH_CASE
        }
    }

    /// Directory name comparer for a casing mode
    pub fn directories(casing: MatchCasing) -> Self {
        if casing.ignores_case() {
            DIRECTORY_NAME_IGNORE_CASE
        } else {
            DIRECTORY_NAME_MATCH_CASE
        }
    }

    /// Whether this comparer folds case
    pub fn ignores_case(&self) -> bool {
        self.ignore_case
    }
}

impl<T: EntryName + ?Sized> KeyComparer<T> for NameComparer {
    type Key = OsString;

    fn key(&self, item: &T) -> OsString {
        let name = item.entry_name();
        if self.ignore_case {
            if let Some(text) = name.to_str() {
                return OsString::from(text.to_lowercase());
            }
        }
        name.to_os_string()
    }
}
