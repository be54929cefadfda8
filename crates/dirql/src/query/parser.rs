//! Statement parser.
//!
//! A precedence-climbing recognizer over the lexeme vector. Expressions are
//! validated but not built into a tree: each clause keeps the range of
//! lexemes it accepted and is reassembled into text for the engine.

use crate::error::{DirqlError, Result};

use super::lexer::{tokenize, unquote, Lexeme, Token};
use super::statement::{ResultColumn, SelectStatement};

// ---------------------------------------------------------------------------
// Operator precedence
// ---------------------------------------------------------------------------

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_EQUALITY: u8 = 4;
const PREC_COMPARISON: u8 = 5;
const PREC_BITWISE: u8 = 6;
const PREC_ADDITIVE: u8 = 7;
const PREC_MULTIPLICATIVE: u8 = 8;
const PREC_CONCAT: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infix {
    Binary(u8),
    Is,
    In { negated: bool },
    Between { negated: bool },
    Like { negated: bool },
    /// `ISNULL` / `NOTNULL` (one lexeme) or `NOT NULL` (two).
    NullTest { lexemes: usize },
}

impl Infix {
    fn precedence(self) -> u8 {
        match self {
            Self::Binary(precedence) => precedence,
            _ => PREC_EQUALITY,
        }
    }
}

// ---------------------------------------------------------------------------
// Statement parser
// ---------------------------------------------------------------------------

pub struct StatementParser<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
    index: usize,
    /// Indices of lexemes consumed as prefix operators.
    prefix_operators: Vec<usize>,
}

impl<'a> StatementParser<'a> {
    pub fn parse(input: &'a str) -> Result<SelectStatement> {
        let lexemes = tokenize(input)?;
        if lexemes.is_empty() {
            return Err(DirqlError::Parse("empty statement".to_string()));
        }

        let mut parser = Self {
            source: input,
            lexemes,
            index: 0,
            prefix_operators: Vec::new(),
        };
        let statement = parser.parse_select()?;
        if let Some(lexeme) = parser.peek() {
            return Err(DirqlError::Parse(format!(
                "unexpected token near byte {}",
                lexeme.span.start
            )));
        }
        Ok(statement)
    }

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select, "SELECT")?;

        let mut statement = SelectStatement::default();
        if self.consume(&Token::Distinct) {
            statement.distinct = true;
        } else {
            self.consume(&Token::All);
        }

        statement.columns = self.parse_result_columns()?;
        statement.path = self.parse_from()?;

        if self.consume(&Token::Where) {
            statement.predicate = Some(self.expression_text()?);
        }
        if self.consume(&Token::Group) {
            self.expect(&Token::By, "BY after GROUP")?;
            statement.group_by = self.expression_texts()?;
            if self.consume(&Token::Having) {
                statement.having = Some(self.expression_text()?);
            }
        }
        if self.consume(&Token::Order) {
            self.expect(&Token::By, "BY after ORDER")?;
            statement.order_by = self.parse_ordering_terms()?;
        }
        if self.consume(&Token::Limit) {
            let first = self.expression_text()?;
            if self.consume(&Token::Offset) {
                statement.limit = Some(first);
                statement.offset = Some(self.expression_text()?);
            } else if self.consume(&Token::Comma) {
                // LIMIT <offset>, <count>
                statement.offset = Some(first);
                statement.limit = Some(self.expression_text()?);
            } else {
                statement.limit = Some(first);
            }
        }

        Ok(statement)
    }

    fn parse_result_columns(&mut self) -> Result<Vec<ResultColumn>> {
        let mut columns = Vec::new();
        loop {
            if self.consume(&Token::Star) {
                columns.push(ResultColumn::Wildcard);
            } else {
                let text = self.expression_text()?;
                let alias = self.parse_alias()?;
                columns.push(ResultColumn::Expr { text, alias });
            }
            if !self.consume(&Token::Comma) {
                return Ok(columns);
            }
        }
    }

    fn parse_alias(&mut self) -> Result<Option<String>> {
        if self.consume(&Token::As) {
            return self
                .consume_name()
                .map(Some)
                .ok_or_else(|| self.error_here("alias after AS"));
        }
        if self.peek_is(&Token::Ident) {
            return Ok(self.consume_name());
        }
        Ok(None)
    }

    fn parse_from(&mut self) -> Result<String> {
        match self.peek().map(|lexeme| &lexeme.token) {
            Some(Token::From(path)) => {
                let path = path.clone();
                self.index += 1;
                Ok(path)
            }
            _ => Err(self.error_here("FROM")),
        }
    }

    fn parse_ordering_terms(&mut self) -> Result<Vec<String>> {
        let mut terms = Vec::new();
        loop {
            let start = self.index;
            self.parse_expression(PREC_OR)?;
            if !self.consume(&Token::Asc) {
                self.consume(&Token::Desc);
            }
            terms.push(self.render(start, self.index));
            if !self.consume(&Token::Comma) {
                return Ok(terms);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn expression_text(&mut self) -> Result<String> {
        let start = self.index;
        self.parse_expression(PREC_OR)?;
        Ok(self.render(start, self.index))
    }

    fn expression_texts(&mut self) -> Result<Vec<String>> {
        let mut texts = vec![self.expression_text()?];
        while self.consume(&Token::Comma) {
            texts.push(self.expression_text()?);
        }
        Ok(texts)
    }

    fn parse_expression_list(&mut self) -> Result<()> {
        self.parse_expression(PREC_OR)?;
        while self.consume(&Token::Comma) {
            self.parse_expression(PREC_OR)?;
        }
        Ok(())
    }

    fn parse_expression(&mut self, min_precedence: u8) -> Result<()> {
        if self.peek_is(&Token::Not) {
            self.consume_prefix_operator();
            self.parse_expression(PREC_NOT)?;
        } else {
            self.parse_unary()?;
        }

        while let Some(infix) = self.peek_infix() {
            if infix.precedence() < min_precedence {
                break;
            }
            self.parse_infix(infix)?;
        }
        Ok(())
    }

    fn peek_infix(&self) -> Option<Infix> {
        let infix = match self.peek_token(0)? {
            Token::Or => Infix::Binary(PREC_OR),
            Token::And => Infix::Binary(PREC_AND),
            Token::Eq | Token::EqEq | Token::NotEq | Token::LtGt => Infix::Binary(PREC_EQUALITY),
            Token::Lt | Token::Le | Token::Gt | Token::Ge => Infix::Binary(PREC_COMPARISON),
            Token::BitAnd | Token::BitOr | Token::ShiftLeft | Token::ShiftRight => {
                Infix::Binary(PREC_BITWISE)
            }
            Token::Plus | Token::Minus => Infix::Binary(PREC_ADDITIVE),
            Token::Star | Token::Slash | Token::Percent => Infix::Binary(PREC_MULTIPLICATIVE),
            Token::Concat => Infix::Binary(PREC_CONCAT),
            Token::Is => Infix::Is,
            Token::In => Infix::In { negated: false },
            Token::Between => Infix::Between { negated: false },
            Token::Like | Token::Glob | Token::Regexp | Token::Match => {
                Infix::Like { negated: false }
            }
            Token::IsNull | Token::NotNull => Infix::NullTest { lexemes: 1 },
            Token::Not => match self.peek_token(1)? {
                Token::In => Infix::In { negated: true },
                Token::Between => Infix::Between { negated: true },
                Token::Like | Token::Glob | Token::Regexp | Token::Match => {
                    Infix::Like { negated: true }
                }
                Token::Null => Infix::NullTest { lexemes: 2 },
                _ => return None,
            },
            _ => return None,
        };
        Some(infix)
    }

    fn parse_infix(&mut self, infix: Infix) -> Result<()> {
        match infix {
            Infix::Binary(precedence) => {
                self.index += 1;
                self.parse_expression(precedence + 1)
            }
            Infix::Is => {
                self.index += 1;
                self.consume(&Token::Not);
                self.parse_expression(PREC_COMPARISON)
            }
            Infix::In { negated } => {
                self.index += 1 + usize::from(negated);
                self.expect(&Token::LParen, "'(' after IN")?;
                if self.consume(&Token::RParen) {
                    return Ok(());
                }
                self.parse_expression_list()?;
                self.expect(&Token::RParen, "')' closing IN list")
            }
            Infix::Between { negated } => {
                self.index += 1 + usize::from(negated);
                self.parse_expression(PREC_COMPARISON)?;
                self.expect(&Token::And, "AND in BETWEEN")?;
                self.parse_expression(PREC_COMPARISON)
            }
            Infix::Like { negated } => {
                self.index += 1 + usize::from(negated);
                self.parse_expression(PREC_COMPARISON)?;
                if self.consume(&Token::Escape) {
                    self.parse_expression(PREC_COMPARISON)?;
                }
                Ok(())
            }
            Infix::NullTest { lexemes } => {
                self.index += lexemes;
                Ok(())
            }
        }
    }

    fn parse_unary(&mut self) -> Result<()> {
        if matches!(
            self.peek_token(0),
            Some(Token::Minus | Token::Plus | Token::Tilde)
        ) {
            self.consume_prefix_operator();
            self.parse_unary()?;
        } else {
            self.parse_primary()?;
        }

        while self.consume(&Token::Collate) {
            if self.consume_name().is_none() {
                return Err(self.error_here("collation name"));
            }
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> Result<()> {
        let Some(token) = self.peek_token(0).cloned() else {
            return Err(self.error_here("expression"));
        };

        match token {
            Token::Number
            | Token::SingleQuoted
            | Token::DoubleQuoted
            | Token::Null
            | Token::CurrentDate
            | Token::CurrentTime
            | Token::CurrentTimestamp => {
                self.index += 1;
                Ok(())
            }
            Token::Ident => {
                self.index += 1;
                if self.consume(&Token::Dot) {
                    self.expect(&Token::Ident, "column name after '.'")
                } else if self.peek_is(&Token::LParen) {
                    self.parse_call_arguments()
                } else {
                    Ok(())
                }
            }
            // Keywords that double as function names, e.g. glob(pattern, name)
            Token::Like | Token::Glob | Token::Regexp | Token::Match
                if self.peek_token(1) == Some(&Token::LParen) =>
            {
                self.index += 1;
                self.parse_call_arguments()
            }
            Token::LParen => {
                self.index += 1;
                self.parse_expression_list()?;
                self.expect(&Token::RParen, "')'")
            }
            Token::Case => self.parse_case(),
            _ => Err(self.error_here("expression")),
        }
    }

    fn parse_call_arguments(&mut self) -> Result<()> {
        self.expect(&Token::LParen, "'('")?;
        if self.consume(&Token::Star) || self.peek_is(&Token::RParen) {
            return self.expect(&Token::RParen, "')' closing call");
        }
        self.consume(&Token::Distinct);
        self.parse_expression_list()?;
        self.expect(&Token::RParen, "')' closing call")
    }

    fn parse_case(&mut self) -> Result<()> {
        self.expect(&Token::Case, "CASE")?;
        if !self.peek_is(&Token::When) {
            self.parse_expression(PREC_OR)?;
        }
        if !self.peek_is(&Token::When) {
            return Err(self.error_here("WHEN"));
        }
        while self.consume(&Token::When) {
            self.parse_expression(PREC_OR)?;
            self.expect(&Token::Then, "THEN")?;
            self.parse_expression(PREC_OR)?;
        }
        if self.consume(&Token::Else) {
            self.parse_expression(PREC_OR)?;
        }
        self.expect(&Token::End, "END closing CASE")
    }

    // -----------------------------------------------------------------------
    // Text reassembly
    // -----------------------------------------------------------------------

    /// Joins the accepted lexemes `[start, end)` with single spaces, except
    /// around parentheses, commas, dots, and prefix operators.
    fn render(&self, start: usize, end: usize) -> String {
        let mut text = String::new();
        for index in start..end {
            let lexeme = &self.lexemes[index];
            if index > start && self.space_before(index) {
                text.push(' ');
            }
            text.push_str(&self.source[lexeme.span.clone()]);
        }
        text
    }

    fn space_before(&self, index: usize) -> bool {
        let previous = &self.lexemes[index - 1].token;
        let current = &self.lexemes[index].token;
        if matches!(current, Token::Comma | Token::RParen | Token::Dot) {
            return false;
        }
        if matches!(previous, Token::LParen | Token::Dot) {
            return false;
        }
        // `- -1` must not collapse into a `--` comment
        if self.is_prefix_operator(index - 1)
            && previous != &Token::Not
            && !self.is_prefix_operator(index)
        {
            return false;
        }
        let is_call = current == &Token::LParen
            && matches!(
                previous,
                Token::Ident | Token::Like | Token::Glob | Token::Regexp | Token::Match
            );
        !is_call
    }

    fn is_prefix_operator(&self, index: usize) -> bool {
        self.prefix_operators.contains(&index)
    }

    // -----------------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------------

    fn consume_prefix_operator(&mut self) {
        self.prefix_operators.push(self.index);
        self.index += 1;
    }

    /// Consumes an identifier or quoted name, returning it unquoted.
    fn consume_name(&mut self) -> Option<String> {
        let lexeme = self.peek()?;
        let name = match lexeme.token {
            Token::Ident => self.source[lexeme.span.clone()].to_string(),
            Token::SingleQuoted | Token::DoubleQuoted => {
                unquote(&self.source[lexeme.span.clone()])
            }
            _ => return None,
        };
        self.index += 1;
        Some(name)
    }

    fn consume(&mut self, token: &Token) -> bool {
        self.peek_is(token) && {
            self.index += 1;
            true
        }
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<()> {
        if self.consume(token) {
            Ok(())
        } else {
            Err(self.error_here(expected))
        }
    }

    fn error_here(&self, expected: &str) -> DirqlError {
        match self.peek() {
            Some(lexeme) => DirqlError::Parse(format!(
                "expected {expected} near byte {}",
                lexeme.span.start
            )),
            None => DirqlError::Parse(format!("expected {expected} but reached end of query")),
        }
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek_token(0) == Some(token)
    }

    fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.lexemes
            .get(self.index + offset)
            .map(|lexeme| &lexeme.token)
    }

    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.index)
    }
}
