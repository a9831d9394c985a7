//! Error types produced while tokenizing and parsing expressions.

use std::fmt;
use thiserror::Error;

/// A quoted literal was opened but never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("column {offset}: unterminated quoted string")]
pub struct LexError {
    /// Character offset of the opening quote.
    pub offset: usize,
}

/// The structural problem a [`ParseError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An open group without a closing `)` or a `)` without an open group.
    UnbalancedParenthesis,
    /// `()` with nothing inside.
    EmptyGroup,
    /// An operator, parenthesis, tag or end of input where the grammar
    /// expects something else.
    UnexpectedToken,
    /// The wildcard marker appears where wildcards are not allowed.
    UnexpectedWildcard,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnbalancedParenthesis => write!(f, "unbalanced parenthesis"),
            ParseErrorKind::EmptyGroup => write!(f, "empty group"),
            ParseErrorKind::UnexpectedToken => write!(f, "unexpected token"),
            ParseErrorKind::UnexpectedWildcard => write!(f, "unexpected wildcard"),
        }
    }
}

/// A grammar violation, located at the token that triggered it.
///
/// The fields are public so callers can build their own messages; the
/// `Display` form is `column N: <kind> 'X'`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column {offset}: {kind} '{value}'")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Character offset of the offending token.
    pub offset: usize,
    /// Literal text of the offending token (empty at end of input).
    pub value: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize, value: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            value: value.into(),
        }
    }
}

/// Any failure of a single parse call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl QueryError {
    /// Character offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            QueryError::Lex(err) => err.offset,
            QueryError::Parse(err) => err.offset,
        }
    }

    /// The parse error kind, or `None` for lexer failures.
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            QueryError::Lex(_) => None,
            QueryError::Parse(err) => Some(err.kind),
        }
    }
}
