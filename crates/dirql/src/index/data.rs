//! Catalog of one walked root.
//!
//! `Catalog` owns the three structures built by a walk:
//! 1. `EntryStore` - one record per walked entry
//! 2. `ClosureIndex` - (ancestor, descendant, depth) edges over entry ids
//! 3. `PathRegistry` - directory paths to ids, used to resolve FROM targets
//!
//! All three are built once and read many times; nothing is ever removed.

use super::closure::ClosureIndex;
use super::registry::PathRegistry;
use crate::error::{DirqlError, Result};
use crate::storage::{Entry, EntryId, EntryStore, NewEntry};

#[derive(Debug, Default)]
pub struct Catalog {
    entries: EntryStore,
    closure: ClosureIndex,
    paths: PathRegistry,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry under `parent` and links it into the closure.
    ///
    /// Fails only when `parent` was never inserted.
    pub fn insert(&mut self, entry: NewEntry, parent: Option<EntryId>) -> Result<EntryId> {
        if let Some(parent) = parent {
            if !self.entries.contains(parent) {
                return Err(DirqlError::Index(format!(
                    "parent {parent} of {:?} is not indexed",
                    entry.name
                )));
            }
        }
        let id = self.entries.push(entry);
        self.closure.insert(id, parent)?;
        Ok(id)
    }

    /// Registers a directory path for later FROM resolution.
    pub(crate) fn register_path(&mut self, path: &str, id: EntryId) -> Result<()> {
        self.paths.register(path, id)
    }

    pub(crate) fn paths_mut(&mut self) -> &mut PathRegistry {
        &mut self.paths
    }

    /// Resolves FROM-path text to an entry id.
    #[inline]
    pub fn resolve_path(&self, text: &str) -> Result<EntryId> {
        self.paths.resolve(text)
    }

    /// `(entry, depth)` for every entry in the subtree of `root`.
    pub fn subtree(&self, root: EntryId) -> impl Iterator<Item = (&Entry, u32)> + '_ {
        self.closure
            .subtree(root)
            .filter_map(|(id, depth)| self.entries.get(id).map(|entry| (entry, depth)))
    }

    #[inline]
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id)
    }

    #[inline]
    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    #[inline]
    pub fn closure(&self) -> &ClosureIndex {
        &self.closure
    }

    #[inline]
    pub fn paths(&self) -> &PathRegistry {
        &self.paths
    }

    /// Returns the number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
