//! Directory tree difference engine for fsync
//!
//! This crate works out what has to change in a second directory tree to
//! make it match a first, authoritative one:
//!
//! - **Set difference**: partition two sequences into left-only, right-only
//!   and matched items ([`partition`])
//! - **Name comparers**: case-folding or exact matching of entry names
//!   ([`comparer`])
//! - **File comparison**: size and digest checks, newest-wins ordering
//!   ([`comparator`], [`hash`])
//! - **Tree walk**: lazy, stack-driven pre-order traversal of both trees
//!   ([`tree`])
//!
//! # Examples
//!
//! ```rust,no_run
//! use fsync_diff::{DirectoryTreeDiffer, SyncRequest};
//! use fsync_types::{ComparisonConfig, EnumerationConfig};
//!
//! # fn example() -> fsync_types::Result<()> {
//! let request = SyncRequest::new("photos", "backup/photos")
//!     .with_enumeration(EnumerationConfig {
//!         recurse_subdirectories: true,
//!         ..EnumerationConfig::default()
//!     })
//!     .with_comparison(ComparisonConfig {
//!         use_size: true,
//!         ..ComparisonConfig::default()
//!     });
//!
//! let differ = DirectoryTreeDiffer::from_request(&request)?;
//! for difference in differ.differences() {
//!     let difference = difference?;
//!     println!("{} {}", difference.kind(), difference.relative_path().display());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod comparator;
pub mod comparer;
pub mod hash;
pub mod listing;
pub mod partition;
pub mod request;
pub mod tree;
pub mod wildcard;

pub use comparator::FileComparator;
pub use comparer::{
    EntryName, NameComparer, DIRECTORY_NAME_IGNORE_CASE, DIRECTORY_NAME_MATCH_CASE,
    FILE_NAME_IGNORE_CASE, FILE_NAME_MATCH_CASE,
};
pub use hash::{hash_file, ContentDigest, ContentHasher};
pub use listing::{DirectoryEntry, DirectoryLister, DirectoryListing, EntryAttributes};
pub use partition::{diff, DiffExt, DiffPartition, IdentityComparer, KeyComparer, SetDiff};
pub use request::SyncRequest;
pub use tree::{DirectoryTreeDiffer, TreeDiff};
pub use wildcard::Wildcard;
