//! Identifier types for type-safe indexing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a walked entry.
///
/// Ids start at 1 and are handed out in insertion order, so a directory's id is
/// always smaller than the ids of everything below it. Using u32 limits an index
/// to ~4 billion entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct EntryId(u32);

impl EntryId {
    /// The first id assigned by an empty store.
    pub const FIRST: Self = Self(1);

    /// Creates an id from its raw value.
    ///
    /// # Panics
    /// Panics if `value` is zero; zero is never assigned.
    #[inline]
    pub fn new(value: u32) -> Self {
        assert!(value > 0, "entry ids start at 1");
        Self(value)
    }

    /// Returns the raw id value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position of this id in dense per-entry tables.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The id stored at a zero-based slot.
    #[inline]
    pub(crate) fn from_slot(slot: usize) -> Self {
        assert!(
            slot < (u32::MAX - 1) as usize,
            "entry id space exhausted"
        );
        Self(slot as u32 + 1)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
