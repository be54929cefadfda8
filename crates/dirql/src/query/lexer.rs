//! Statement tokenizer.
//!
//! Everything except the FROM target is lexed by `logos`. The target is not a
//! SQL token at all (`./nested/path` is a valid bare target), so the `FROM`
//! keyword's callback scans it straight off the remaining input.

use std::ops::Range;

use logos::{Lexer, Logos};

use crate::error::{DirqlError, Result};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Clause keywords
    #[token("select", ignore(ascii_case))]
    Select,
    #[token("distinct", ignore(ascii_case))]
    Distinct,
    #[token("all", ignore(ascii_case))]
    All,
    /// `FROM` together with its unescaped path target.
    #[token("from", lex_from_target, ignore(ascii_case))]
    From(String),
    #[token("where", ignore(ascii_case))]
    Where,
    #[token("group", ignore(ascii_case))]
    Group,
    #[token("by", ignore(ascii_case))]
    By,
    #[token("having", ignore(ascii_case))]
    Having,
    #[token("order", ignore(ascii_case))]
    Order,
    #[token("limit", ignore(ascii_case))]
    Limit,
    #[token("offset", ignore(ascii_case))]
    Offset,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("asc", ignore(ascii_case))]
    Asc,
    #[token("desc", ignore(ascii_case))]
    Desc,
    #[token("collate", ignore(ascii_case))]
    Collate,

    // Expression keywords
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("is", ignore(ascii_case))]
    Is,
    #[token("isnull", ignore(ascii_case))]
    IsNull,
    #[token("notnull", ignore(ascii_case))]
    NotNull,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("in", ignore(ascii_case))]
    In,
    #[token("between", ignore(ascii_case))]
    Between,
    #[token("like", ignore(ascii_case))]
    Like,
    #[token("glob", ignore(ascii_case))]
    Glob,
    #[token("regexp", ignore(ascii_case))]
    Regexp,
    #[token("match", ignore(ascii_case))]
    Match,
    #[token("escape", ignore(ascii_case))]
    Escape,
    #[token("case", ignore(ascii_case))]
    Case,
    #[token("when", ignore(ascii_case))]
    When,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("current_date", ignore(ascii_case))]
    CurrentDate,
    #[token("current_time", ignore(ascii_case))]
    CurrentTime,
    #[token("current_timestamp", ignore(ascii_case))]
    CurrentTimestamp,

    // Operands
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?|0[xX][0-9a-fA-F]+")]
    Number,
    #[regex(r#""([^"]|"")*""#)]
    DoubleQuoted,
    #[regex("'([^']|'')*'")]
    SingleQuoted,

    // Operators
    #[token("||")]
    Concat,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token("&")]
    BitAnd,
    #[token("|")]
    BitOr,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<>")]
    LtGt,
    #[token("~")]
    Tilde,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
}

/// One token with its byte span in the statement text.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Splits a statement into lexemes, failing at the first unrecognized byte.
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>> {
    let mut lexemes = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => lexemes.push(Lexeme { token, span }),
            Err(()) => {
                // A rejected FROM target surfaces as an error over the keyword
                let detail = if input[span.clone()].eq_ignore_ascii_case("from") {
                    "missing or malformed FROM path"
                } else {
                    "unrecognized input"
                };
                return Err(DirqlError::Parse(format!(
                    "{detail} near byte {}",
                    span.start
                )));
            }
        }
    }
    Ok(lexemes)
}

// ---------------------------------------------------------------------------
// FROM targets
// ---------------------------------------------------------------------------

fn lex_from_target(lex: &mut Lexer<Token>) -> Option<String> {
    let rest = lex.remainder();
    let target = rest.trim_start();
    let leading = rest.len() - target.len();
    let (consumed, path) = scan_path(target)?;
    lex.bump(leading + consumed);
    Some(path)
}

/// Scans a path target off the front of `input`.
///
/// Returns the number of bytes consumed and the unescaped path.
pub fn scan_path(input: &str) -> Option<(usize, String)> {
    let first = input.chars().next()?;
    if first == '"' || first == '\'' {
        return scan_quoted(input, first);
    }
    if first.is_ascii_digit() {
        return None;
    }

    let end = input
        .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
        .unwrap_or(input.len());
    (end > 0).then(|| (end, input[..end].to_string()))
}

/// Quoted targets accept backslash escapes and a doubled quote.
fn scan_quoted(input: &str, quote: char) -> Option<(usize, String)> {
    let mut path = String::new();
    let mut chars = input.char_indices().skip(1).peekable();
    while let Some((index, c)) = chars.next() {
        if c == '\\' {
            let (_, escaped) = chars.next()?;
            path.push(escaped);
        } else if c == quote {
            match chars.peek() {
                Some(&(_, next)) if next == quote => {
                    chars.next();
                    path.push(quote);
                }
                _ => return Some((index + c.len_utf8(), path)),
            }
        } else {
            path.push(c);
        }
    }
    None
}

/// Strips the quotes from a quoted alias, undoubling embedded quotes.
pub fn unquote(text: &str) -> String {
    let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return text.to_string();
    };
    let inner = text
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(text);
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string())
}
