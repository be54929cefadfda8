//! Catalog construction from an ordered stream of directory visits.
//!
//! The walk hands over one `DirectoryVisit` per directory, parents before
//! children. Each visit inserts the directory itself, registers its path, and
//! inserts its files underneath it. Subdirectories are inserted when their own
//! visit arrives, so each directory's metadata is consumed exactly once.

use fnv::FnvHashSet;

use super::data::Catalog;
use super::path::{join_relative, normalize_relative_path, split_parent, ROOT_PATH};
use crate::error::{DirqlError, Result};
use crate::storage::{EntryId, NewEntry};
use crate::types::EntryStat;

/// A file (or other non-directory) child reported by a visit.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub name: String,
    pub stat: EntryStat,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, stat: EntryStat) -> Self {
        Self {
            name: name.into(),
            stat,
        }
    }
}

/// One directory of the walk: its own metadata plus its immediate children.
#[derive(Debug, Clone)]
pub struct DirectoryVisit {
    /// Path relative to the walk root; `"."` is the root.
    pub directory: String,
    pub stat: EntryStat,
    /// Names of immediate subdirectories; each gets its own visit later.
    pub subdirectories: Vec<String>,
    pub files: Vec<FileRecord>,
}

impl DirectoryVisit {
    pub fn new(directory: impl Into<String>, stat: EntryStat) -> Self {
        Self {
            directory: directory.into(),
            stat,
            subdirectories: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_subdirectory(mut self, name: impl Into<String>) -> Self {
        self.subdirectories.push(name.into());
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, stat: EntryStat) -> Self {
        self.files.push(FileRecord::new(name, stat));
        self
    }
}

/// Spelling of the `directory` field of inserted entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryNaming {
    Relative,
    /// Absolute, under the given normalized walk root.
    Absolute(String),
}

impl DirectoryNaming {
    fn spell(&self, relative: &str) -> String {
        match self {
            Self::Relative => relative.to_string(),
            Self::Absolute(root) if relative == ROOT_PATH => root.clone(),
            Self::Absolute(root) if root.ends_with('/') => format!("{root}{relative}"),
            Self::Absolute(root) => format!("{root}/{relative}"),
        }
    }
}

/// Counters reported once a walk has been consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: usize,
    pub files: usize,
}

/// Drives catalog insertion from directory visits.
pub struct WalkDriver<'a> {
    catalog: &'a mut Catalog,
    naming: DirectoryNaming,
    announced: FnvHashSet<String>,
    stats: WalkStats,
}

impl<'a> WalkDriver<'a> {
    pub fn new(catalog: &'a mut Catalog, naming: DirectoryNaming) -> Self {
        if let DirectoryNaming::Absolute(root) = &naming {
            catalog.paths_mut().set_absolute_root(root);
        }
        Self {
            catalog,
            naming,
            announced: FnvHashSet::default(),
            stats: WalkStats::default(),
        }
    }

    /// Consumes a whole visit stream.
    pub fn drive<I>(mut self, visits: I) -> Result<WalkStats>
    where
        I: IntoIterator<Item = DirectoryVisit>,
    {
        for visit in visits {
            self.visit(visit)?;
        }
        Ok(self.finish())
    }

    /// Inserts one directory and its files. Returns the directory's id.
    pub fn visit(&mut self, visit: DirectoryVisit) -> Result<EntryId> {
        let DirectoryVisit {
            directory,
            stat,
            subdirectories,
            files,
        } = visit;

        let path = normalize_relative_path(&directory).ok_or_else(|| {
            DirqlError::Index(format!("directory path {directory:?} is outside the walk root"))
        })?;

        let id = match split_parent(&path) {
            None => {
                if !self.catalog.is_empty() {
                    return Err(DirqlError::Index(
                        "walk root must be the first visit".to_string(),
                    ));
                }
                let entry = NewEntry::new(ROOT_PATH, self.naming.spell(ROOT_PATH), stat);
                self.catalog.insert(entry, None)?
            }
            Some((parent_path, name)) => {
                if self.catalog.paths().get(&path).is_some() {
                    return Err(DirqlError::Index(format!("directory {path:?} visited twice")));
                }
                let parent = self.catalog.paths().get(parent_path).ok_or_else(|| {
                    DirqlError::Index(format!(
                        "directory {path:?} visited before its parent {parent_path:?}"
                    ))
                })?;
                let entry = NewEntry::new(name, self.naming.spell(parent_path), stat);
                self.catalog.insert(entry, Some(parent))?
            }
        };
        self.catalog.register_path(&path, id)?;
        self.announced.remove(&path);
        self.stats.directories += 1;

        let spelled = self.naming.spell(&path);
        for file in files {
            self.catalog
                .insert(NewEntry::new(file.name, spelled.clone(), file.stat), Some(id))?;
            self.stats.files += 1;
        }

        for name in subdirectories {
            self.announced.insert(join_relative(&path, &name));
        }

        Ok(id)
    }

    /// Finishes the walk, logging subdirectories that were announced but never visited.
    pub fn finish(self) -> WalkStats {
        if !self.announced.is_empty() {
            let mut missing: Vec<&String> = self.announced.iter().collect();
            missing.sort_unstable();
            log::warn!(
                "dirql walk skipped {} announced directories: {:?}",
                missing.len(),
                missing
            );
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryKind, EntryStat};

    fn dir_stat() -> EntryStat {
        EntryStat::synthetic(EntryKind::Directory, 4096)
    }

    fn file_stat(size: u64) -> EntryStat {
        EntryStat::synthetic(EntryKind::Regular, size)
    }

    /// root/file1, root/subdir1/{file2,file3}, root/subdir2/{file4, subdir3/file5}
    fn scenario_b() -> Vec<DirectoryVisit> {
        vec![
            DirectoryVisit::new(".", dir_stat())
                .with_subdirectory("subdir1")
                .with_subdirectory("subdir2")
                .with_file("file1", file_stat(100)),
            DirectoryVisit::new("subdir1", dir_stat())
                .with_file("file2", file_stat(200))
                .with_file("file3", file_stat(300)),
            DirectoryVisit::new("subdir2", dir_stat())
                .with_subdirectory("subdir3")
                .with_file("file4", file_stat(400)),
            DirectoryVisit::new("subdir2/subdir3", dir_stat()).with_file("file5", file_stat(500)),
        ]
    }

    fn build(visits: Vec<DirectoryVisit>) -> (Catalog, WalkStats) {
        let mut catalog = Catalog::new();
        let stats = WalkDriver::new(&mut catalog, DirectoryNaming::Relative)
            .drive(visits)
            .unwrap();
        (catalog, stats)
    }

    fn subtree_names(catalog: &Catalog, path: &str) -> Vec<String> {
        let root = catalog.resolve_path(path).unwrap();
        let mut names: Vec<String> = catalog
            .subtree(root)
            .map(|(entry, _)| entry.name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn root_is_first_and_registered_as_dot() {
        let (catalog, stats) = build(scenario_b());
        assert_eq!(stats, WalkStats { directories: 4, files: 5 });
        assert_eq!(catalog.resolve_path(".").unwrap(), EntryId::FIRST);
        let root = catalog.entry(EntryId::FIRST).unwrap();
        assert_eq!(root.name, ".");
        assert_eq!(root.directory, ".");
    }

    #[test]
    fn scoped_subtrees_match_the_tree() {
        let (catalog, _) = build(scenario_b());
        assert_eq!(subtree_names(&catalog, "subdir1"), vec!["file2", "file3", "subdir1"]);
        assert_eq!(
            subtree_names(&catalog, "."),
            vec![".", "file1", "file2", "file3", "file4", "file5", "subdir1", "subdir2", "subdir3"]
        );
        assert_eq!(
            subtree_names(&catalog, "subdir2"),
            vec!["file4", "file5", "subdir2", "subdir3"]
        );
    }

    #[test]
    fn parents_always_have_smaller_ids() {
        let (catalog, _) = build(scenario_b());
        for edge in catalog.closure().edges() {
            assert!(edge.ancestor_id <= edge.descendant_id);
        }
    }

    #[test]
    fn every_entry_has_one_edge_per_ancestor() {
        let (catalog, _) = build(scenario_b());
        for entry in catalog.entries().iter() {
            let mut depths: Vec<u32> = catalog
                .closure()
                .ancestors(entry.id)
                .map(|(_, depth)| depth)
                .collect();
            depths.sort_unstable();
            let expected: Vec<u32> = (0..depths.len() as u32).collect();
            assert_eq!(depths, expected, "entry {}", entry.name);
        }
    }

    #[test]
    fn relative_directories_are_recorded() {
        let (catalog, _) = build(scenario_b());
        let file5 = catalog
            .entries()
            .iter()
            .find(|entry| entry.name == "file5")
            .unwrap();
        assert_eq!(file5.directory, "subdir2/subdir3");
        assert_eq!(file5.full_path(), "subdir2/subdir3/file5");

        let subdir3 = catalog
            .entries()
            .iter()
            .find(|entry| entry.name == "subdir3")
            .unwrap();
        assert_eq!(subdir3.directory, "subdir2");
    }

    #[test]
    fn absolute_naming_prefixes_the_root() {
        let mut catalog = Catalog::new();
        WalkDriver::new(&mut catalog, DirectoryNaming::Absolute("/data/root".to_string()))
            .drive(scenario_b())
            .unwrap();

        let root = catalog.entry(EntryId::FIRST).unwrap();
        assert_eq!(root.directory, "/data/root");
        assert_eq!(root.full_path(), "/data/root");
        let file2 = catalog
            .entries()
            .iter()
            .find(|entry| entry.name == "file2")
            .unwrap();
        assert_eq!(file2.directory, "/data/root/subdir1");
        assert_eq!(
            catalog.resolve_path("/data/root/subdir1").unwrap(),
            catalog.resolve_path("subdir1").unwrap()
        );
    }

    #[test]
    fn child_before_parent_is_a_precondition_failure() {
        let mut catalog = Catalog::new();
        let mut driver = WalkDriver::new(&mut catalog, DirectoryNaming::Relative);
        driver.visit(DirectoryVisit::new(".", dir_stat())).unwrap();
        let error = driver
            .visit(DirectoryVisit::new("a/b", dir_stat()))
            .unwrap_err();
        assert!(matches!(error, DirqlError::Index(_)));
    }

    #[test]
    fn walk_must_start_at_root() {
        let mut catalog = Catalog::new();
        let error = WalkDriver::new(&mut catalog, DirectoryNaming::Relative)
            .drive(vec![DirectoryVisit::new("sub", dir_stat())])
            .unwrap_err();
        assert!(matches!(error, DirqlError::Index(_)));
    }

    #[test]
    fn second_root_visit_is_rejected() {
        let mut catalog = Catalog::new();
        let error = WalkDriver::new(&mut catalog, DirectoryNaming::Relative)
            .drive(vec![
                DirectoryVisit::new(".", dir_stat()),
                DirectoryVisit::new("./", dir_stat()),
            ])
            .unwrap_err();
        assert!(matches!(error, DirqlError::Index(_)));
    }
}
