//! One-level directory listing with attribute and name filtering

use crate::comparer::EntryName;
use crate::wildcard::Wildcard;
use fsync_types::{EnumerationConfig, Error, Result};
use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name of the current-directory entry
pub const CURRENT_DIRECTORY: &str = ".";
/// Name of the parent-directory entry
pub const PARENT_DIRECTORY: &str = "..";

/// A file or directory found by [`DirectoryLister::list`]
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    path: PathBuf,
    name: OsString,
    metadata: Metadata,
}

impl DirectoryEntry {
    /// Full path of the entry
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Metadata captured at listing time
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether this is `.` or `..`
    pub fn is_special(&self) -> bool {
        self.name == CURRENT_DIRECTORY || self.name == PARENT_DIRECTORY
    }

    /// Split into path, name and metadata
    pub fn into_parts(self) -> (PathBuf, OsString, Metadata) {
        (self.path, self.name, self.metadata)
    }
}

impl AsRef<Path> for DirectoryEntry {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl EntryName for DirectoryEntry {
    fn entry_name(&self) -> &OsStr {
        &self.name
    }
}

/// Immediate children of one directory, each group sorted by name
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    /// Regular files passing every filter
    pub files: Vec<DirectoryEntry>,
    /// Subdirectories passing the attribute filter
    pub directories: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    /// Whether nothing was listed
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

/// Attributes that can exclude an entry from a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryAttributes {
    /// Hidden entry
    pub hidden: bool,
    /// Operating-system file
    pub system: bool,
    /// Sparse file
    pub sparse: bool,
    /// Encrypted file
    pub encrypted: bool,
}

impl EntryAttributes {
    /// Read the attributes of an entry
    #[cfg(windows)]
    pub fn of(_name: &OsStr, metadata: &Metadata) -> Self {
        use std::os::windows::fs::MetadataExt;

        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
        const FILE_ATTRIBUTE_SPARSE_FILE: u32 = 0x200;
        const FILE_ATTRIBUTE_ENCRYPTED: u32 = 0x4000;

        let attributes = metadata.file_attributes();
        Self {
            hidden: attributes & FILE_ATTRIBUTE_HIDDEN != 0,
            system: attributes & FILE_ATTRIBUTE_SYSTEM != 0,
            sparse: attributes & FILE_ATTRIBUTE_SPARSE_FILE != 0,
            encrypted: attributes & FILE_ATTRIBUTE_ENCRYPTED != 0,
        }
    }

    /// Read the attributes of an entry
    ///
    /// Only the dot-file convention is available here; the other attributes
    /// are never set.
    #[cfg(not(windows))]
    pub fn of(name: &OsStr, _metadata: &Metadata) -> Self {
        Self {
            hidden: name.to_str().map_or(false, |n| n.starts_with('.')),
            ..Self::default()
        }
    }

    /// Whether the configuration excludes an entry with these attributes
    pub fn excluded_by(&self, config: &EnumerationConfig) -> bool {
        (self.hidden && !config.include_hidden)
            || (self.system && !config.include_system)
            || (self.sparse && !config.include_sparse)
            || (self.encrypted && !config.include_encrypted)
    }
}

/// Lists directories according to an [`EnumerationConfig`]
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    config: EnumerationConfig,
    wildcard: Wildcard,
}

impl DirectoryLister {
    /// Create a lister, rejecting invalid configurations
    pub fn new(config: EnumerationConfig) -> Result<Self> {
        config.validate()?;
        let wildcard = Wildcard::new(&config.wildcard, config.match_casing.ignores_case());
        Ok(Self { config, wildcard })
    }

    /// Enumeration settings in use
    pub fn config(&self) -> &EnumerationConfig {
        &self.config
    }

    /// List the immediate children of `dir`
    ///
    /// Links to files are listed with their target's metadata; links to
    /// directories and dangling links are skipped. When the directory cannot
    /// be read and inaccessible directories are ignored, an empty listing is
    /// returned.
    pub fn list(&self, dir: &Path) -> Result<DirectoryListing> {
        match self.read_children(dir) {
            Ok(listing) => Ok(listing),
            Err(e) if self.config.ignore_inaccessible => {
                warn!("Skipping inaccessible directory {}: {}", dir.display(), e);
                Ok(DirectoryListing::default())
            }
            Err(e) => Err(e),
        }
    }

    fn read_children(&self, dir: &Path) -> Result<DirectoryListing> {
        let mut listing = DirectoryListing::default();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 && self.config.ignore_inaccessible => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
                Err(e) => return Err(Error::from(e)),
            };

            let metadata = if entry.path_is_symlink() {
                match std::fs::metadata(entry.path()) {
                    Ok(target) if target.is_file() => target,
                    Ok(_) => {
                        debug!("Skipping directory link: {}", entry.path().display());
                        continue;
                    }
                    Err(e) => {
                        warn!("Skipping dangling link {}: {}", entry.path().display(), e);
                        continue;
                    }
                }
            } else {
                match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(e) if self.config.ignore_inaccessible => {
                        warn!("Skipping {}: {}", entry.path().display(), e);
                        continue;
                    }
                    Err(e) => return Err(Error::from(e)),
                }
            };

            let name = entry.file_name().to_os_string();
            if EntryAttributes::of(&name, &metadata).excluded_by(&self.config) {
                continue;
            }

            let file_type = metadata.file_type();
            if file_type.is_dir() {
                listing.directories.push(DirectoryEntry {
                    path: entry.into_path(),
                    name,
                    metadata,
                });
            } else if file_type.is_file() {
                if !self.wildcard.matches(&name.to_string_lossy()) {
                    continue;
                }
                listing.files.push(DirectoryEntry {
                    path: entry.into_path(),
                    name,
                    metadata,
                });
            }
        }

        if self.config.include_special_directories {
            push_special_directories(dir, &mut listing);
        }

        Ok(listing)
    }
}

fn push_special_directories(dir: &Path, listing: &mut DirectoryListing) {
    let mut special = Vec::with_capacity(2);
    for name in [CURRENT_DIRECTORY, PARENT_DIRECTORY] {
        let path = dir.join(name);
        let Ok(metadata) = std::fs::metadata(&path) else {
            continue;
        };
        special.push(DirectoryEntry {
            path,
            name: OsString::from(name),
            metadata,
        });
    }
    special.append(&mut listing.directories);
    listing.directories = special;
}
