//! Filesystem walking that produces the ordered visit stream.
//!
//! The walk runs in two steps:
//! - `walk_it` builds a `Node` tree, statting children in parallel with rayon
//!   and sorting them by name so the result is deterministic
//! - `into_visits` flattens the tree in preorder into `DirectoryVisit`s, which
//!   guarantees every directory is visited before anything below it

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use fnv::FnvHashSet;
use rayon::prelude::*;

use super::construct::DirectoryVisit;
use super::path::{join_relative, ROOT_PATH};
use crate::error::Result;
use crate::types::EntryStat;

/// A node in the filesystem tree built during walking.
#[derive(Debug)]
pub struct Node {
    /// Child nodes, sorted by name.
    pub children: Vec<Node>,
    /// The file name (not the full path).
    pub name: Box<str>,
    pub stat: EntryStat,
}

impl Node {
    pub fn leaf(name: Box<str>, stat: EntryStat) -> Self {
        Self {
            children: Vec::new(),
            name,
            stat,
        }
    }
}

/// Data shared by the parallel walker.
#[derive(Debug)]
pub struct WalkData<'a> {
    /// Number of files scanned.
    pub num_files: AtomicUsize,
    /// Number of directories scanned.
    pub num_dirs: AtomicUsize,
    /// Number of entries skipped because they could not be read.
    pub num_errors: AtomicUsize,
    /// Root path being indexed.
    pub root_path: &'a Path,
    /// Paths to ignore during walking.
    pub ignore_directories: &'a [PathBuf],
}

impl<'a> WalkData<'a> {
    pub fn new(root_path: &'a Path, ignore_directories: &'a [PathBuf]) -> Self {
        Self {
            num_files: AtomicUsize::new(0),
            num_dirs: AtomicUsize::new(0),
            num_errors: AtomicUsize::new(0),
            root_path,
            ignore_directories,
        }
    }

    /// Returns true if the given path should be ignored.
    fn should_ignore(&self, path: &Path) -> bool {
        self.ignore_directories
            .iter()
            .any(|ignored| path == ignored || path.starts_with(ignored))
    }

    fn record_error(&self, path: &Path, error: &std::io::Error) {
        self.num_errors.fetch_add(1, Ordering::Relaxed);
        log::warn!("dirql walk skipped path={} error={}", path.display(), error);
    }
}

/// Walks the filesystem from the root and builds a node tree.
///
/// The root is named `"."`. Fails only when the root itself cannot be read.
pub fn walk_it(walk_data: &WalkData) -> Result<Node> {
    let metadata = fs::symlink_metadata(walk_data.root_path)?;
    let stat = EntryStat::from_fs_metadata(&metadata);
    if !metadata.file_type().is_dir() {
        walk_data.num_files.fetch_add(1, Ordering::Relaxed);
        return Ok(Node::leaf(ROOT_PATH.into(), stat));
    }

    walk_data.num_dirs.fetch_add(1, Ordering::Relaxed);
    let children = walk_children(walk_data.root_path, walk_data);
    Ok(Node {
        children,
        name: ROOT_PATH.into(),
        stat,
    })
}

/// Core recursive walk for an entry below the root.
fn walk(path: &Path, name: Box<str>, walk_data: &WalkData) -> Option<Node> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            walk_data.record_error(path, &error);
            return None;
        }
    };
    let stat = EntryStat::from_fs_metadata(&metadata);

    if metadata.file_type().is_dir() {
        walk_data.num_dirs.fetch_add(1, Ordering::Relaxed);
        Some(Node {
            children: walk_children(path, walk_data),
            name,
            stat,
        })
    } else {
        walk_data.num_files.fetch_add(1, Ordering::Relaxed);
        Some(Node::leaf(name, stat))
    }
}

/// Reads and walks the children of a directory in parallel, sorted by name.
fn walk_children(path: &Path, walk_data: &WalkData) -> Vec<Node> {
    let read_dir = match fs::read_dir(path) {
        Ok(iter) => iter,
        Err(error) => {
            // Unreadable directory: keep it, without children
            walk_data.record_error(path, &error);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(error) => walk_data.record_error(path, &error),
        }
    }

    let mut children: Vec<Node> = entries
        .into_par_iter()
        .filter_map(|entry| {
            let child_path = entry.path();
            if walk_data.should_ignore(&child_path) {
                return None;
            }
            let name = entry
                .file_name()
                .to_string_lossy()
                .into_owned()
                .into_boxed_str();
            walk(&child_path, name, walk_data)
        })
        .collect();

    children.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    drop_colliding_directories(path, &mut children, walk_data);
    children
}

/// Keeps the first of several subdirectories whose names only differ as raw
/// bytes. They share one text name and would share one registry key.
fn drop_colliding_directories(path: &Path, children: &mut Vec<Node>, walk_data: &WalkData) {
    let mut seen: FnvHashSet<Box<str>> = FnvHashSet::default();
    children.retain(|child| {
        if !child.stat.is_dir() || seen.insert(child.name.clone()) {
            return true;
        }
        walk_data.num_errors.fetch_add(1, Ordering::Relaxed);
        log::warn!(
            "dirql walk skipped directory with colliding name path={} name={}",
            path.display(),
            child.name
        );
        false
    });
}

/// Flattens a walked tree into directory visits, parents first.
pub fn into_visits(root: Node) -> Vec<DirectoryVisit> {
    let mut visits = Vec::new();
    push_visits(ROOT_PATH.to_string(), root, &mut visits);
    visits
}

fn push_visits(path: String, node: Node, visits: &mut Vec<DirectoryVisit>) {
    let mut visit = DirectoryVisit::new(path.clone(), node.stat);
    let mut subdirectories = Vec::new();

    for child in node.children {
        if child.stat.is_dir() {
            visit.subdirectories.push(child.name.to_string());
            subdirectories.push(child);
        } else {
            visit = visit.with_file(child.name, child.stat);
        }
    }

    visits.push(visit);
    for child in subdirectories {
        let child_path = join_relative(&path, &child.name);
        push_visits(child_path, child, visits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn walk_empty_directory() {
        let temp = TempDir::new().unwrap();
        let walk_data = WalkData::new(temp.path(), &[]);
        let root = walk_it(&walk_data).unwrap();

        assert_eq!(root.name.as_ref(), ".");
        assert!(root.stat.is_dir());
        assert!(root.children.is_empty());
        assert_eq!(walk_data.num_dirs.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn walk_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let walk_data = WalkData::new(&missing, &[]);
        assert!(walk_it(&walk_data).is_err());
    }

    #[test]
    fn children_sorted_alphabetically() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("zebra.txt")).unwrap();
        File::create(temp.path().join("apple.txt")).unwrap();
        File::create(temp.path().join("mango.txt")).unwrap();

        let walk_data = WalkData::new(temp.path(), &[]);
        let root = walk_it(&walk_data).unwrap();
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_ref()).collect();

        assert_eq!(names, vec!["apple.txt", "mango.txt", "zebra.txt"]);
        assert_eq!(walk_data.num_files.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn walk_ignores_paths() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("include")).unwrap();
        fs::create_dir(temp.path().join("exclude")).unwrap();
        File::create(temp.path().join("include/a.txt")).unwrap();
        File::create(temp.path().join("exclude/b.txt")).unwrap();

        let ignore = vec![temp.path().join("exclude")];
        let walk_data = WalkData::new(temp.path(), &ignore);
        let root = walk_it(&walk_data).unwrap();

        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name.as_ref(), "include");
    }

    #[test]
    fn visits_are_preorder() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("b/c")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        File::create(temp.path().join("root.txt")).unwrap();
        File::create(temp.path().join("b/c/deep.txt")).unwrap();

        let walk_data = WalkData::new(temp.path(), &[]);
        let visits = into_visits(walk_it(&walk_data).unwrap());

        let order: Vec<&str> = visits.iter().map(|v| v.directory.as_str()).collect();
        assert_eq!(order, vec![".", "a", "b", "b/c"]);

        assert_eq!(visits[0].subdirectories, vec!["a", "b"]);
        assert_eq!(visits[0].files.len(), 1);
        assert_eq!(visits[0].files[0].name, "root.txt");
        assert_eq!(visits[3].files[0].name, "deep.txt");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn directories_with_colliding_text_names_keep_one() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(OsStr::from_bytes(b"a\xff"))).unwrap();
        fs::create_dir(temp.path().join(OsStr::from_bytes(b"a\xfe"))).unwrap();
        File::create(temp.path().join("b.txt")).unwrap();

        let walk_data = WalkData::new(temp.path(), &[]);
        let visits = into_visits(walk_it(&walk_data).unwrap());

        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].subdirectories, vec!["a\u{FFFD}"]);
        assert_eq!(visits[0].files.len(), 1);
        assert_eq!(walk_data.num_errors.load(Ordering::Relaxed), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_reported_not_followed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("target")).unwrap();
        File::create(temp.path().join("target/inner.txt")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("target"), temp.path().join("link")).unwrap();

        let walk_data = WalkData::new(temp.path(), &[]);
        let visits = into_visits(walk_it(&walk_data).unwrap());

        assert_eq!(visits.len(), 2);
        let link = visits[0].files.iter().find(|f| f.name == "link").unwrap();
        assert_eq!(link.stat.kind(), Some(crate::types::EntryKind::Symlink));
    }
}
