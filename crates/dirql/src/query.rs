//! Statement parsing and rewriting.
//!
//! This module turns query text into an engine request:
//! - `lexer` - logos tokenizer, including FROM target scanning
//! - `parser` - precedence-climbing recognizer producing a `SelectStatement`
//! - `statement` - the parsed statement and its result columns
//! - `rewrite` - FROM resolution and `*` expansion into an `EngineRequest`

mod lexer;
mod parser;
mod rewrite;
mod statement;

pub use lexer::{tokenize, Lexeme, Token};
pub use parser::StatementParser;
pub use rewrite::{rewrite, EngineRequest, Projection, RowSource};
pub use statement::{ResultColumn, SelectStatement};
