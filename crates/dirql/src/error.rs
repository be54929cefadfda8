use std::fs;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DirqlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The query text was rejected by the grammar.
    #[error("parser error: {0}")]
    Parse(String),

    /// The grammar accepted the statement but its FROM path was never walked.
    #[error("unknown path: {0}")]
    UnknownPath(String),

    /// A walk or insertion violated the parent-before-child ordering.
    #[error("Index error: {0}")]
    Index(String),

    /// Forwarded verbatim from the relational engine.
    #[error("engine error: {0}")]
    Engine(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for DirqlError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Engine(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DirqlError>;

/// Canonicalizes a path, returning the original if canonicalization fails.
pub fn canonicalize_existing_path(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}
