//! Core value types shared by the walker, the index, and the query layer.
//!
//! The session converts these into engine rows; nothing here knows about SQL.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode bits
// ---------------------------------------------------------------------------

const S_IFMT: u32 = 0o170000;
const S_IFSOCK: u32 = 0o140000;
const S_IFLNK: u32 = 0o120000;
const S_IFREG: u32 = 0o100000;
const S_IFBLK: u32 = 0o060000;
const S_IFDIR: u32 = 0o040000;
const S_IFCHR: u32 = 0o020000;
const S_IFIFO: u32 = 0o010000;

/// Kind of a filesystem entry, derived from its mode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Directory,
    Regular,
    CharDevice,
    BlockDevice,
    Fifo,
    Symlink,
    Socket,
}

impl EntryKind {
    /// Maps the file-type bits of a stat mode. Unknown types yield `None`.
    pub fn from_mode(mode: u32) -> Option<Self> {
        match mode & S_IFMT {
            S_IFDIR => Some(Self::Directory),
            S_IFREG => Some(Self::Regular),
            S_IFCHR => Some(Self::CharDevice),
            S_IFBLK => Some(Self::BlockDevice),
            S_IFIFO => Some(Self::Fifo),
            S_IFLNK => Some(Self::Symlink),
            S_IFSOCK => Some(Self::Socket),
            _ => None,
        }
    }

    /// The file-type bits for this kind, as they appear in a stat mode.
    pub fn mode_bits(self) -> u32 {
        match self {
            Self::Directory => S_IFDIR,
            Self::Regular => S_IFREG,
            Self::CharDevice => S_IFCHR,
            Self::BlockDevice => S_IFBLK,
            Self::Fifo => S_IFIFO,
            Self::Symlink => S_IFLNK,
            Self::Socket => S_IFSOCK,
        }
    }

    /// Single-character code exposed through the `file_type` column.
    pub fn code(self) -> char {
        match self {
            Self::Directory => 'D',
            Self::Regular => 'F',
            Self::CharDevice => 'C',
            Self::BlockDevice => 'B',
            Self::Fifo => 'N',
            Self::Symlink => 'L',
            Self::Socket => 'S',
        }
    }
}

// ---------------------------------------------------------------------------
// Stat records
// ---------------------------------------------------------------------------

/// Metadata captured for one entry at walk time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStat {
    /// Raw stat mode; only the file-type bits are interpreted.
    pub mode: u32,
    pub size: u64,
    pub access_time: NaiveDateTime,
    pub modification_time: NaiveDateTime,
    pub creation_time: Option<NaiveDateTime>,
    pub owner_id: u32,
    pub group_id: u32,
}

impl EntryStat {
    /// Builds a stat record for a kind and size with zeroed times and ownership.
    pub fn synthetic(kind: EntryKind, size: u64) -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH.naive_utc();
        Self {
            mode: kind.mode_bits(),
            size,
            access_time: epoch,
            modification_time: epoch,
            creation_time: None,
            owner_id: 0,
            group_id: 0,
        }
    }

    /// Captures a stat record from filesystem metadata (not following symlinks).
    pub fn from_fs_metadata(metadata: &fs::Metadata) -> Self {
        let access_time = local_time(metadata.accessed().unwrap_or(UNIX_EPOCH));
        let modification_time = local_time(metadata.modified().unwrap_or(UNIX_EPOCH));
        let creation_time = metadata.created().ok().map(local_time);
        let (mode, owner_id, group_id) = ownership_and_mode(metadata);

        Self {
            mode,
            size: metadata.len(),
            access_time,
            modification_time,
            creation_time,
            owner_id,
            group_id,
        }
    }

    #[inline]
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::from_mode(self.mode)
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind() == Some(EntryKind::Directory)
    }
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}

#[cfg(unix)]
fn ownership_and_mode(metadata: &fs::Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (metadata.mode(), metadata.uid(), metadata.gid())
}

#[cfg(not(unix))]
fn ownership_and_mode(metadata: &fs::Metadata) -> (u32, u32, u32) {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Regular
    };
    (kind.mode_bits(), 0, 0)
}

// ---------------------------------------------------------------------------
// Index options
// ---------------------------------------------------------------------------

/// How the `directory` column of an entry is spelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathStyle {
    /// Relative to the walk root, which itself is `"."`.
    #[default]
    Relative,
    /// Absolute, prefixed with the canonical walk root.
    Absolute,
}

/// Options controlling how a directory tree is indexed.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub path_style: PathStyle,
    /// Directories skipped entirely during the walk.
    pub ignore_directories: Vec<PathBuf>,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_style(mut self, path_style: PathStyle) -> Self {
        self.path_style = path_style;
        self
    }

    pub fn with_ignored(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_directories.push(path.into());
        self
    }
}
