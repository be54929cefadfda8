//! Relational execution of rewritten statements.
//!
//! The index hands the engine a `Catalog`; the engine owns whatever copy of it
//! it needs to evaluate predicates, grouping, and ordering.

mod rows;
mod sqlite;

pub use rows::{RowSet, Value};
pub use sqlite::{render_sql, SqliteEngine};

use crate::error::Result;
use crate::query::EngineRequest;

/// Evaluates an engine request over the `files`/`relations` schema.
pub trait RelationalEngine {
    fn execute(&self, request: &EngineRequest) -> Result<RowSet>;
}
