//! SQL-like queries over filesystem metadata.
//!
//! This crate indexes a directory tree once and answers read-only queries:
//! - A parallel walker producing parent-first directory visits
//! - A closure-table index (entries, ancestor edges, directory paths)
//! - A parser for a restricted `SELECT ... FROM <path>` grammar
//! - A rewriter that scopes statements to the FROM subtree
//! - An in-memory SQLite engine evaluating the rewritten statement

pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod schema;
pub mod session;
pub mod storage;
pub mod types;

// Re-export main types
pub use engine::{RelationalEngine, RowSet, SqliteEngine, Value};
pub use error::{DirqlError, Result};
pub use index::{Catalog, ClosureIndex, DirectoryVisit, PathRegistry, WalkDriver};
pub use query::{EngineRequest, SelectStatement, StatementParser};
pub use session::Session;
pub use storage::{Entry, EntryId};
pub use types::{EntryKind, EntryStat, IndexOptions, PathStyle};
