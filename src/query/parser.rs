//! Recursive-descent parser for the tag query language.
//!
//! ```text
//! expr         := IDENT | '(' union ')'
//! difference   := expr ('-' expr)*
//! intersection := difference ('&' difference)*
//! union        := intersection ('|' intersection)*
//! ```
//!
//! Difference binds tightest and union loosest; all operators are
//! left-associative, so `a - b & c | d` reads as `((a - b) & c) | d`.

use crate::query::expr::QueryExpression;
use thiserror::Error;

/// Errors reported for malformed query text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown tag name: \"{0}\"")]
    UnknownTag(String),

    #[error("Unmatched parenthesis")]
    UnmatchedParenthesis,

    #[error("Unexpected end of input")]
    UnexpectedEnd,

    #[error("Syntax Error at '{ch}'")]
    UnexpectedChar { ch: char, pos: usize },
}

/// Resolves identifiers to atomic set indices
pub trait TagLookup {
    fn tag_index(&self, name: &str) -> Option<usize>;
}

impl<S: AsRef<str>> TagLookup for [S] {
    fn tag_index(&self, name: &str) -> Option<usize> {
        self.iter().position(|tag| tag.as_ref() == name)
    }
}

impl<S: AsRef<str>> TagLookup for Vec<S> {
    fn tag_index(&self, name: &str) -> Option<usize> {
        self.as_slice().tag_index(name)
    }
}

impl<S: AsRef<str>, const N: usize> TagLookup for [S; N] {
    fn tag_index(&self, name: &str) -> Option<usize> {
        self.as_slice().tag_index(name)
    }
}

/// Parse `input` into an expression, resolving identifiers with `tags`
pub fn parse_query<T: TagLookup + ?Sized>(input: &str, tags: &T) -> Result<QueryExpression, ParseError> {
    let mut parser = QueryParser::new(input, tags);
    parser.parse()
}

struct QueryParser<'a, T: ?Sized> {
    input: &'a str,
    pos: usize,
    tags: &'a T,
}

impl<'a, T: TagLookup + ?Sized> QueryParser<'a, T> {
    fn new(input: &'a str, tags: &'a T) -> Self {
        Self { input, pos: 0, tags }
    }

    fn parse(&mut self) -> Result<QueryExpression, ParseError> {
        let expr = self.parse_union()?;

        // Anything left over means the formula did not end where the input did
        self.skip_whitespace();
        match self.peek_char() {
            None => Ok(expr),
            Some(')') => Err(ParseError::UnmatchedParenthesis),
            Some(ch) => Err(ParseError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    fn parse_union(&mut self) -> Result<QueryExpression, ParseError> {
        let mut expr = self.parse_intersection()?;

        self.skip_whitespace();
        while self.consume_char('|') {
            let rhs = self.parse_intersection()?;
            expr = expr | rhs;
            self.skip_whitespace();
        }

        Ok(expr)
    }

    fn parse_intersection(&mut self) -> Result<QueryExpression, ParseError> {
        let mut expr = self.parse_difference()?;

        self.skip_whitespace();
        while self.consume_char('&') {
            let rhs = self.parse_difference()?;
            expr = expr & rhs;
            self.skip_whitespace();
        }

        Ok(expr)
    }

    fn parse_difference(&mut self) -> Result<QueryExpression, ParseError> {
        let mut expr = self.parse_expression()?;

        self.skip_whitespace();
        while self.consume_char('-') {
            let rhs = self.parse_expression()?;
            expr = expr - rhs;
            self.skip_whitespace();
        }

        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<QueryExpression, ParseError> {
        self.skip_whitespace();

        match self.peek_char() {
            Some('(') => {
                self.advance();
                let expr = self.parse_union()?;
                self.skip_whitespace();
                if !self.consume_char(')') {
                    return Err(ParseError::UnmatchedParenthesis);
                }
                Ok(expr)
            }
            Some(ch) if ch.is_ascii_alphanumeric() => self.parse_identifier(),
            Some(ch) => Err(ParseError::UnexpectedChar { ch, pos: self.pos }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_identifier(&mut self) -> Result<QueryExpression, ParseError> {
        let start = self.pos;
        while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.advance();
        }

        let name = &self.input[start..self.pos];
        match self.tags.tag_index(name) {
            Some(index) => Ok(QueryExpression::atom(index)),
            None => Err(ParseError::UnknownTag(name.to_string())),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}
