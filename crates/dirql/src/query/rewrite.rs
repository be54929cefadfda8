//! Rewriting a parsed statement into an engine request.
//!
//! The FROM path is resolved to an entry id and replaced by a subtree row
//! source; `*` is expanded to the wildcard columns. Every other clause is
//! forwarded as text and never evaluated here.

use serde::Serialize;

use super::statement::{ResultColumn, SelectStatement};
use crate::error::Result;
use crate::index::PathRegistry;
use crate::schema::WILDCARD_COLUMNS;
use crate::storage::EntryId;

/// Rows the engine should read before applying the statement's clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowSource {
    /// Entries joined with their closure edges from `root`.
    Subtree { root: EntryId },
}

/// One output column of the engine request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub expr: String,
    pub alias: Option<String>,
}

impl Projection {
    pub fn new(expr: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            expr: expr.into(),
            alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineRequest {
    pub distinct: bool,
    pub columns: Vec<Projection>,
    pub source: RowSource,
    pub predicate: Option<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    pub order_by: Vec<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Resolves the FROM path and expands `*`.
///
/// Fails with `UnknownPath` when the path was never walked.
pub fn rewrite(statement: &SelectStatement, paths: &PathRegistry) -> Result<EngineRequest> {
    let root = paths.resolve(&statement.path)?;

    let mut columns = Vec::with_capacity(statement.columns.len());
    for column in &statement.columns {
        match column {
            ResultColumn::Wildcard => {
                columns.extend(WILDCARD_COLUMNS.iter().map(|wildcard| {
                    Projection::new(wildcard.qualified(), Some(wildcard.name.to_string()))
                }));
            }
            ResultColumn::Expr { text, alias } => {
                columns.push(Projection::new(text.clone(), alias.clone()));
            }
        }
    }

    Ok(EngineRequest {
        distinct: statement.distinct,
        columns,
        source: RowSource::Subtree { root },
        predicate: statement.predicate.clone(),
        group_by: statement.group_by.clone(),
        having: statement.having.clone(),
        order_by: statement.order_by.clone(),
        limit: statement.limit.clone(),
        offset: statement.offset.clone(),
    })
}
