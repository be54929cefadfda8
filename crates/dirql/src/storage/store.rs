//! Append-only arena of walked entries.

use super::entry::{Entry, NewEntry};
use super::index_types::EntryId;

/// Owns every entry of one walk. Ids are dense, so lookups are direct indexing.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry under the next id.
    pub fn push(&mut self, new: NewEntry) -> EntryId {
        let id = self.next_id();
        self.entries.push(Entry::assign(id, new));
        id
    }

    /// The id the next `push` will assign.
    #[inline]
    pub fn next_id(&self) -> EntryId {
        EntryId::from_slot(self.entries.len())
    }

    #[inline]
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.slot())
    }

    #[inline]
    pub fn contains(&self, id: EntryId) -> bool {
        id.slot() < self.entries.len()
    }

    /// Iterates entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
