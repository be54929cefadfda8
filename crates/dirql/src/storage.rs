//! Entry storage for the directory index.
//!
//! This module provides the leaf data structures of the index:
//! - `EntryId`, the monotonically assigned identifier of a walked entry
//! - `Entry`, one record per file or directory
//! - `EntryStore`, the append-only arena that owns the records

mod entry;
mod index_types;
mod store;

pub use entry::{Entry, NewEntry};
pub use index_types::EntryId;
pub use store::EntryStore;
