//! Parsed statement types.
//!
//! Expressions are kept as text fragments; only the FROM target and the
//! result column list are interpreted before the statement reaches the engine.

use std::fmt;

use serde::Serialize;

/// One entry of the result column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultColumn {
    /// `*`, expanded by the rewriter.
    Wildcard,
    Expr {
        text: String,
        alias: Option<String>,
    },
}

impl ResultColumn {
    pub fn expr(text: impl Into<String>) -> Self {
        Self::Expr {
            text: text.into(),
            alias: None,
        }
    }

    pub fn aliased(text: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Expr {
            text: text.into(),
            alias: Some(alias.into()),
        }
    }
}

impl fmt::Display for ResultColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Expr { text, alias: None } => f.write_str(text),
            Self::Expr {
                text,
                alias: Some(alias),
            } => write!(f, "{text} AS {alias}"),
        }
    }
}

/// A statement accepted by the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectStatement {
    /// FROM target, unescaped but not yet normalized.
    pub path: String,
    pub distinct: bool,
    pub columns: Vec<ResultColumn>,
    pub predicate: Option<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    /// Ordering terms, each with its COLLATE and direction kept in the text.
    pub order_by: Vec<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}
