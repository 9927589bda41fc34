//! Recursive difference between two directory trees
//!
//! The walk is pre-order and driven by an explicit stack of directory pairs,
//! so depth is bounded by memory rather than the call stack. Within one pair,
//! files are reported before anything below it. A branch that exists on one
//! side only is still descended so that every file in it is reported.

use crate::comparator::FileComparator;
use crate::comparer::NameComparer;
use crate::listing::{DirectoryEntry, DirectoryLister, DirectoryListing};
use crate::partition::{diff, DiffPartition, SetDiff};
use crate::request::SyncRequest;
use fsync_types::{ComparisonConfig, EnumerationConfig, Error, FileDifference, FileEntry, Result};
use std::path::{Path, PathBuf};
use std::vec;
use tracing::{debug, trace};

/// Computes the file differences between two directory trees
#[derive(Debug, Clone)]
pub struct DirectoryTreeDiffer {
    first: PathBuf,
    second: PathBuf,
    lister: DirectoryLister,
    comparator: FileComparator,
    file_names: NameComparer,
    directory_names: NameComparer,
}

impl DirectoryTreeDiffer {
    /// Create a differ for `first` (authoritative) against `second`
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        first: P,
        second: Q,
        enumeration: EnumerationConfig,
        comparison: ComparisonConfig,
    ) -> Result<Self> {
        let first = first.into();
        let second = second.into();
        if first.as_os_str().is_empty() {
            return Err(Error::config("First directory must not be empty"));
        }
        if second.as_os_str().is_empty() {
            return Err(Error::config("Second directory must not be empty"));
        }

        let file_names = NameComparer::files(enumeration.match_casing);
        let directory_names = NameComparer::directories(enumeration.match_casing);
        Ok(Self {
            first,
            second,
            lister: DirectoryLister::new(enumeration)?,
            comparator: FileComparator::new(comparison)?,
            file_names,
            directory_names,
        })
    }

    /// Create a differ from a resolved request
    pub fn from_request(request: &SyncRequest) -> Result<Self> {
        Self::new(
            &request.first,
            &request.second,
            request.enumeration.clone(),
            request.comparison,
        )
    }

    /// First (authoritative) root
    pub fn first(&self) -> &Path {
        &self.first
    }

    /// Second root
    pub fn second(&self) -> &Path {
        &self.second
    }

    /// Lazily walk both trees
    ///
    /// Each call starts a fresh walk. Listing and comparison failures are
    /// yielded in place; the walk then moves on to the next pending
    /// directory pair.
    pub fn differences(&self) -> TreeDiff<'_> {
        TreeDiff {
            differ: self,
            stack: vec![Frame {
                first: Some(self.first.clone()),
                second: Some(self.second.clone()),
                relative: PathBuf::new(),
            }],
            current: None,
        }
    }

    fn recurse(&self) -> bool {
        self.lister.config().recurse_subdirectories
    }

    fn classify(
        &self,
        partition: DiffPartition<DirectoryEntry>,
        relative: &Path,
    ) -> Result<FileDifference> {
        match partition {
            DiffPartition::Left(entry) => Ok(FileDifference::created(file_entry(entry, relative))),
            DiffPartition::Right(entry) => Ok(FileDifference::deleted(file_entry(entry, relative))),
            DiffPartition::Intersecting(first, second) => self
                .comparator
                .classify(file_entry(first, relative), file_entry(second, relative)),
        }
    }
}

fn file_entry(entry: DirectoryEntry, relative: &Path) -> FileEntry {
    let (path, name, metadata) = entry.into_parts();
    FileEntry::from_metadata(path, relative.join(name), &metadata)
}

/// One pair of directories waiting to be compared
#[derive(Debug)]
struct Frame {
    first: Option<PathBuf>,
    second: Option<PathBuf>,
    relative: PathBuf,
}

type FilePartitions = SetDiff<DirectoryEntry, vec::IntoIter<DirectoryEntry>, NameComparer>;

#[derive(Debug)]
struct OpenFrame {
    files: FilePartitions,
    relative: PathBuf,
}

/// Iterator over the differences of a [`DirectoryTreeDiffer`]
#[derive(Debug)]
pub struct TreeDiff<'a> {
    differ: &'a DirectoryTreeDiffer,
    stack: Vec<Frame>,
    current: Option<OpenFrame>,
}

impl TreeDiff<'_> {
    fn list(&self, dir: Option<&Path>) -> Result<DirectoryListing> {
        dir.map_or_else(|| Ok(DirectoryListing::default()), |d| self.differ.lister.list(d))
    }

    fn open(&mut self, frame: Frame) -> Result<()> {
        if frame.first.is_none() && frame.second.is_none() {
            return Err(Error::internal(format!(
                "directory pair '{}' has neither side",
                frame.relative.display()
            )));
        }

        debug!(
            "Comparing {} <-> {}",
            display_side(frame.first.as_deref()),
            display_side(frame.second.as_deref())
        );

        let first = self.list(frame.first.as_deref())?;
        let second = self.list(frame.second.as_deref())?;

        if self.differ.recurse() {
            self.push_children(&frame, first.directories, second.directories);
        }

        self.current = Some(OpenFrame {
            files: diff(first.files, second.files, self.differ.file_names),
            relative: frame.relative,
        });
        Ok(())
    }

    fn push_children(
        &mut self,
        parent: &Frame,
        first: Vec<DirectoryEntry>,
        second: Vec<DirectoryEntry>,
    ) {
        let children: Vec<Frame> = diff(first, second, self.differ.directory_names)
            .filter(|p| !p.left().or(p.right()).map_or(false, DirectoryEntry::is_special))
            .map(|partition| {
                let (first, second) = partition.into_parts();
                // Matched pairs use the second side's spelling.
                let name = second
                    .as_ref()
                    .or(first.as_ref())
                    .map(|e| e.name().to_os_string())
                    .unwrap_or_default();
                Frame {
                    first: first.map(|e| e.into_parts().0),
                    second: second.map(|e| e.into_parts().0),
                    relative: parent.relative.join(name),
                }
            })
            .collect();

        trace!(
            "{} subdirectories pending under '{}'",
            children.len(),
            parent.relative.display()
        );
        self.stack.extend(children.into_iter().rev());
    }
}

fn display_side(side: Option<&Path>) -> String {
    side.map_or_else(|| "<absent>".to_string(), |p| p.display().to_string())
}

impl Iterator for TreeDiff<'_> {
    type Item = Result<FileDifference>;

    fn next(&mut self) -> Option<Self::Item> {
        let differ = self.differ;
        loop {
            if let Some(open) = self.current.as_mut() {
                if let Some(partition) = open.files.next() {
                    return Some(differ.classify(partition, &open.relative));
                }
                self.current = None;
            }

            let frame = self.stack.pop()?;
            if let Err(e) = self.open(frame) {
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsync_types::{DifferenceKind, MatchCasing};
    use std::fs;
    use tempfile::TempDir;

    fn recursive() -> EnumerationConfig {
        EnumerationConfig {
            recurse_subdirectories: true,
            ..EnumerationConfig::default()
        }
    }

    fn collect(differ: &DirectoryTreeDiffer) -> Vec<(DifferenceKind, PathBuf)> {
        differ
            .differences()
            .map(|d| {
                let d = d.unwrap();
                (d.kind(), d.relative_path().to_path_buf())
            })
            .collect()
    }

    #[test]
    fn test_created_and_deleted_at_top_level() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("x.txt"), b"x").unwrap();
        fs::write(b.join("y.txt"), b"y").unwrap();

        let differ =
            DirectoryTreeDiffer::new(&a, &b, EnumerationConfig::default(), ComparisonConfig::default())
                .unwrap();

        assert_eq!(
            collect(&differ),
            vec![
                (DifferenceKind::Deleted, PathBuf::from("y.txt")),
                (DifferenceKind::Created, PathBuf::from("x.txt")),
            ]
        );
    }

    #[test]
    fn test_one_sided_branch_is_descended() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        fs::create_dir_all(a.join("only").join("deeper")).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("only").join("one.txt"), b"1").unwrap();
        fs::write(a.join("only").join("deeper").join("two.txt"), b"2").unwrap();

        let differ = DirectoryTreeDiffer::new(&a, &b, recursive(), ComparisonConfig::default()).unwrap();

        assert_eq!(
            collect(&differ),
            vec![
                (DifferenceKind::Created, PathBuf::from("only/one.txt")),
                (DifferenceKind::Created, PathBuf::from("only/deeper/two.txt")),
            ]
        );
    }

    #[test]
    fn test_without_recursion_only_top_level() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        fs::create_dir_all(a.join("sub")).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("sub").join("hidden-away.txt"), b"1").unwrap();

        let differ =
            DirectoryTreeDiffer::new(&a, &b, EnumerationConfig::default(), ComparisonConfig::default())
                .unwrap();

        assert!(collect(&differ).is_empty());
    }

    #[test]
    fn test_preorder_files_before_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        for root in [&a, &b] {
            fs::create_dir_all(root.join("d1")).unwrap();
            fs::create_dir_all(root.join("d2")).unwrap();
        }
        fs::write(a.join("top.txt"), b"t").unwrap();
        fs::write(a.join("d1").join("one.txt"), b"1").unwrap();
        fs::write(a.join("d2").join("two.txt"), b"2").unwrap();

        let differ = DirectoryTreeDiffer::new(&a, &b, recursive(), ComparisonConfig::default()).unwrap();

        let paths: Vec<PathBuf> = collect(&differ).into_iter().map(|(_, p)| p).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("top.txt"),
                PathBuf::from("d1/one.txt"),
                PathBuf::from("d2/two.txt"),
            ]
        );
    }

    #[test]
    fn test_directory_names_follow_casing() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        fs::create_dir_all(a.join("Docs")).unwrap();
        fs::create_dir_all(b.join("docs")).unwrap();
        fs::write(a.join("Docs").join("f.txt"), b"same").unwrap();
        fs::write(b.join("docs").join("f.txt"), b"same").unwrap();

        let insensitive =
            DirectoryTreeDiffer::new(&a, &b, recursive(), ComparisonConfig::default()).unwrap();
        assert_eq!(
            collect(&insensitive),
            vec![(DifferenceKind::None, PathBuf::from("docs/f.txt"))]
        );

        let sensitive = DirectoryTreeDiffer::new(
            &a,
            &b,
            EnumerationConfig {
                match_casing: MatchCasing::CaseSensitive,
                ..recursive()
            },
            ComparisonConfig::default(),
        )
        .unwrap();
        let kinds: Vec<DifferenceKind> = collect(&sensitive).into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&DifferenceKind::Created));
        assert!(kinds.contains(&DifferenceKind::Deleted));
    }

    #[test]
    fn test_matched_directory_keeps_second_spelling() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        fs::create_dir_all(a.join("Reports").join("Q1")).unwrap();
        fs::create_dir_all(b.join("reports").join("q1")).unwrap();
        fs::write(a.join("Reports").join("Q1").join("new.csv"), b"n").unwrap();
        fs::create_dir_all(a.join("Only")).unwrap();
        fs::write(a.join("Only").join("x.txt"), b"x").unwrap();

        let differ =
            DirectoryTreeDiffer::new(&a, &b, recursive(), ComparisonConfig::default()).unwrap();
        let mut found = collect(&differ);
        found.sort_by(|x, y| x.1.cmp(&y.1));
        assert_eq!(
            found,
            vec![
                (DifferenceKind::Created, PathBuf::from("Only/x.txt")),
                (DifferenceKind::Created, PathBuf::from("reports/q1/new.csv")),
            ]
        );
    }

    #[test]
    fn test_special_directories_are_not_descended() {
        let temp_dir = TempDir::new().unwrap();
        let (a, b) = (temp_dir.path().join("a"), temp_dir.path().join("b"));
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("f.txt"), b"f").unwrap();

        let differ = DirectoryTreeDiffer::new(
            &a,
            &b,
            EnumerationConfig {
                include_special_directories: true,
                ..recursive()
            },
            ComparisonConfig::default(),
        )
        .unwrap();

        assert_eq!(
            collect(&differ),
            vec![(DifferenceKind::Created, PathBuf::from("f.txt"))]
        );
    }

    #[test]
    fn test_missing_root_yields_error_then_ends() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        fs::create_dir_all(&a).unwrap();

        let differ = DirectoryTreeDiffer::new(
            &a,
            temp_dir.path().join("missing"),
            EnumerationConfig::default(),
            ComparisonConfig::default(),
        )
        .unwrap();

        let items: Vec<_> = differ.differences().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Enumeration { .. })));
    }

    #[test]
    fn test_empty_root_rejected() {
        let err = DirectoryTreeDiffer::new(
            "",
            "b",
            EnumerationConfig::default(),
            ComparisonConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_pair_with_no_sides_is_internal_error() {
        let differ =
            DirectoryTreeDiffer::new("a", "b", EnumerationConfig::default(), ComparisonConfig::default())
                .unwrap();
        let mut walk = TreeDiff {
            differ: &differ,
            stack: vec![Frame {
                first: None,
                second: None,
                relative: PathBuf::from("ghost"),
            }],
            current: None,
        };

        assert!(matches!(walk.next(), Some(Err(Error::Internal { .. }))));
        assert!(walk.next().is_none());
    }
}
