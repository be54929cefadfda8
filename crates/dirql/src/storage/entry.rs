//! Entry records for walked filesystem objects.

use std::fmt;

use chrono::NaiveDateTime;

use super::index_types::EntryId;
use crate::types::{EntryKind, EntryStat};

/// An entry before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Base name, or `"."` for the walk root.
    pub name: String,
    /// Containing directory, spelled per the configured path style.
    pub directory: String,
    pub stat: EntryStat,
}

impl NewEntry {
    pub fn new(name: impl Into<String>, directory: impl Into<String>, stat: EntryStat) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            stat,
        }
    }
}

/// One walked file or directory. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub directory: String,
    pub kind: Option<EntryKind>,
    pub size: u64,
    pub access_time: NaiveDateTime,
    pub modification_time: NaiveDateTime,
    pub creation_time: Option<NaiveDateTime>,
    pub owner_id: u32,
    pub group_id: u32,
}

impl Entry {
    pub(crate) fn assign(id: EntryId, new: NewEntry) -> Self {
        let NewEntry {
            name,
            directory,
            stat,
        } = new;
        Self {
            id,
            kind: stat.kind(),
            name,
            directory,
            size: stat.size,
            access_time: stat.access_time,
            modification_time: stat.modification_time,
            creation_time: stat.creation_time,
            owner_id: stat.owner_id,
            group_id: stat.group_id,
        }
    }

    /// The `file_type` column value; `None` for unmapped modes.
    pub fn type_code(&self) -> Option<char> {
        self.kind.map(EntryKind::code)
    }

    /// Directory and name joined. The walk root is its own directory.
    pub fn full_path(&self) -> String {
        if self.name == "." {
            self.directory.clone()
        } else if self.directory == "." || self.directory.is_empty() {
            self.name.clone()
        } else if self.directory.ends_with('/') {
            format!("{}{}", self.directory, self.name)
        } else {
            format!("{}/{}", self.directory, self.name)
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, directory: &str) -> Entry {
        Entry::assign(
            EntryId::FIRST,
            NewEntry::new(name, directory, EntryStat::synthetic(EntryKind::Regular, 10)),
        )
    }

    #[test]
    fn full_path_joins_directory_and_name() {
        assert_eq!(entry("file2", "subdir1").full_path(), "subdir1/file2");
        assert_eq!(entry("file1", ".").full_path(), "file1");
        assert_eq!(entry("file1", "/").full_path(), "/file1");
        assert_eq!(entry(".", "/data/root").full_path(), "/data/root");
    }

    #[test]
    fn assign_derives_kind_from_mode() {
        let stored = entry("file1", ".");
        assert_eq!(stored.kind, Some(EntryKind::Regular));
        assert_eq!(stored.type_code(), Some('F'));
        assert_eq!(stored.to_string(), "file1");
    }

    #[test]
    fn unmapped_mode_has_no_type_code() {
        let mut stat = EntryStat::synthetic(EntryKind::Regular, 0);
        stat.mode = 0;
        let stored = Entry::assign(EntryId::FIRST, NewEntry::new("odd", ".", stat));
        assert_eq!(stored.kind, None);
        assert_eq!(stored.type_code(), None);
    }
}
