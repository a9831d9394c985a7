//! Boolean query language over string tags.
//!
//! Syntax:
//!   tag                     - tag is present
//!   "two words"             - quoted tag (single or double quotes)
//!   bug*                    - any tag matching the wildcard pattern
//!   expr1 AND expr2         - AND
//!   expr1 OR expr2          - OR (note: lower precedence than AND)
//!   NOT expr                - NOT
//!   (expr)                  - grouping
//!
//! Keywords are case-insensitive; quote a tag to use a keyword as its name.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod render;
mod visitor;

pub use ast::*;
pub use error::{LexError, ParseError, ParseErrorKind, QueryError};
pub use eval::{Matcher, TagSet, matches, matches_with};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{ExpressionParser, TagListParser, parse_expression, parse_tag_list};
pub use render::{Renderer, render};
pub use visitor::{TagCollector, Visitor, referenced_tags};
