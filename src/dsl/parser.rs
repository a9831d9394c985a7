//! Parsers for tag query expressions and plain tag lists.
//!
//! Grammar (in rough EBNF):
//!
//! expression = or_expr
//! or_expr    = and_expr ("OR" and_expr)*
//! and_expr   = unary ("AND" unary)*
//! unary      = "NOT" unary | primary
//! primary    = "(" expression ")" | STRING | WILDCARD
//!
//! Connectives are never implied: `a b` is an error. Empty input parses to
//! [`Expression::Empty`].

use tracing::debug;

use super::ast::{ChainBuilder, Connective, Expression, Pattern};
use super::error::{ParseError, ParseErrorKind, QueryError};
use super::lexer::{Lexer, Token, TokenKind};
use crate::config::ParserOptions;

/// Parser state for a single call.
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
    wildcard: char,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, options: &ParserOptions) -> Result<Self, QueryError> {
        let mut lexer = Lexer::new(input, options);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
            wildcard: options.wildcard,
        })
    }

    fn peek(&self) -> TokenKind {
        self.current.kind
    }

    fn advance(&mut self) -> Result<Token, QueryError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error(&self, kind: ParseErrorKind) -> QueryError {
        error_at(kind, &self.current)
    }

    /// Parse the top-level expression and require the whole input to be used.
    fn parse_expression(&mut self) -> Result<Expression, QueryError> {
        if self.peek() == TokenKind::End {
            return Ok(Expression::Empty);
        }

        let expr = self.parse_or_expr()?;

        match self.peek() {
            TokenKind::End => Ok(expr),
            TokenKind::RParen => Err(self.error(ParseErrorKind::UnbalancedParenthesis)),
            _ => Err(self.error(ParseErrorKind::UnexpectedToken)),
        }
    }

    /// Parse OR expression: and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<Expression, QueryError> {
        let mut chain = ChainBuilder::new(Connective::Or, self.parse_and_expr()?);

        while self.peek() == TokenKind::Or {
            self.advance()?; // consume OR
            chain.add(self.parse_and_expr()?);
        }

        Ok(chain.finish())
    }

    /// Parse AND expression: unary ("AND" unary)*
    fn parse_and_expr(&mut self) -> Result<Expression, QueryError> {
        let mut chain = ChainBuilder::new(Connective::And, self.parse_unary()?);

        while self.peek() == TokenKind::And {
            self.advance()?; // consume AND
            chain.add(self.parse_unary()?);
        }

        Ok(chain.finish())
    }

    /// Parse unary expression: "NOT" unary | primary
    fn parse_unary(&mut self) -> Result<Expression, QueryError> {
        if self.peek() == TokenKind::Not {
            self.advance()?; // consume NOT
            let operand = self.parse_unary()?;
            Ok(Expression::not(operand))
        } else {
            self.parse_primary()
        }
    }

    /// Parse primary expression: "(" expression ")" | STRING | WILDCARD
    fn parse_primary(&mut self) -> Result<Expression, QueryError> {
        match self.peek() {
            TokenKind::String if self.current.value.is_empty() => {
                Err(self.error(ParseErrorKind::UnexpectedToken))
            }
            TokenKind::String => {
                let token = self.advance()?;
                Ok(self.tag_or_pattern(token.value))
            }
            TokenKind::Wildcard => {
                let token = self.advance()?;
                Ok(Expression::Pattern(Pattern::from_text(
                    &token.value,
                    self.wildcard,
                )))
            }
            TokenKind::LParen => self.parse_group(),
            TokenKind::RParen if self.depth == 0 => {
                Err(self.error(ParseErrorKind::UnbalancedParenthesis))
            }
            TokenKind::RParen
            | TokenKind::And
            | TokenKind::Or
            | TokenKind::Not
            | TokenKind::End => Err(self.error(ParseErrorKind::UnexpectedToken)),
        }
    }

    fn parse_group(&mut self) -> Result<Expression, QueryError> {
        let open = self.advance()?; // consume (

        if self.peek() == TokenKind::RParen {
            return Err(error_at(ParseErrorKind::EmptyGroup, &open));
        }

        self.depth += 1;
        let inner = self.parse_or_expr()?;
        self.depth -= 1;

        match self.peek() {
            TokenKind::RParen => {
                self.advance()?; // consume )
                Ok(inner)
            }
            TokenKind::End => Err(error_at(ParseErrorKind::UnbalancedParenthesis, &open)),
            _ => Err(self.error(ParseErrorKind::UnexpectedToken)),
        }
    }

    fn tag_or_pattern(&self, text: String) -> Expression {
        if text.contains(self.wildcard) {
            Expression::Pattern(Pattern::from_text(&text, self.wildcard))
        } else {
            Expression::Tag(text)
        }
    }
}

fn error_at(kind: ParseErrorKind, token: &Token) -> QueryError {
    ParseError::new(kind, token.offset, token.value.clone()).into()
}

/// Parses boolean tag query expressions.
#[derive(Debug, Clone, Default)]
pub struct ExpressionParser {
    options: ParserOptions,
}

impl ExpressionParser {
    pub fn new(options: ParserOptions) -> Self {
        ExpressionParser { options }
    }

    /// Parse `input` into an expression tree.
    ///
    /// # Errors
    /// Returns the first lexer or grammar error encountered; no partial tree
    /// is produced. An empty quoted tag (`""`) is an
    /// [`ParseErrorKind::UnexpectedToken`].
    ///
    /// # Panics
    /// Recursion depth follows group and `NOT` nesting, so deeply nested
    /// input can overflow the stack. Callers accepting untrusted input must
    /// bound its length or nesting depth before parsing.
    pub fn parse(&self, input: &str) -> Result<Expression, QueryError> {
        let result = Parser::new(input, &self.options).and_then(|mut parser| parser.parse_expression());
        match &result {
            Ok(_) => debug!(len = input.len(), "parsed expression"),
            Err(err) => debug!(%err, "failed to parse expression"),
        }
        result
    }
}

/// Parse a query expression with the default options.
pub fn parse_expression(input: &str) -> Result<Expression, QueryError> {
    ExpressionParser::default().parse(input)
}

/// Parses space-separated tag lists such as `a b "c d"`.
///
/// Every token must be a tag; connectives, parentheses and wildcards are
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct TagListParser {
    options: ParserOptions,
}

impl TagListParser {
    pub fn new(options: ParserOptions) -> Self {
        TagListParser { options }
    }

    /// Parse into [`Expression::Empty`], a single [`Expression::Tag`] or an
    /// [`Expression::And`] of tags.
    ///
    /// # Errors
    /// Returns [`ParseErrorKind::UnexpectedWildcard`] for any tag containing
    /// the wildcard marker and [`ParseErrorKind::UnexpectedToken`] for
    /// keywords, parentheses and empty quoted tags.
    pub fn parse(&self, input: &str) -> Result<Expression, QueryError> {
        let mut tags = self.parse_as_vec(input)?.into_iter().map(Expression::Tag);

        let Some(first) = tags.next() else {
            return Ok(Expression::Empty);
        };
        let mut chain = ChainBuilder::new(Connective::And, first);
        for tag in tags {
            chain.add(tag);
        }
        Ok(chain.finish())
    }

    /// Parse into the tag names in input order.
    ///
    /// # Errors
    /// See [`TagListParser::parse`].
    pub fn parse_as_vec(&self, input: &str) -> Result<Vec<String>, QueryError> {
        let mut tags = Vec::new();

        for token in Lexer::new(input, &self.options) {
            let token = token?;
            match token.kind {
                TokenKind::End => break,
                TokenKind::Wildcard => {
                    return Err(error_at(ParseErrorKind::UnexpectedWildcard, &token));
                }
                TokenKind::String if token.value.contains(self.options.wildcard) => {
                    return Err(error_at(ParseErrorKind::UnexpectedWildcard, &token));
                }
                TokenKind::String if token.value.is_empty() => {
                    return Err(error_at(ParseErrorKind::UnexpectedToken, &token));
                }
                TokenKind::String => tags.push(token.value),
                _ => return Err(error_at(ParseErrorKind::UnexpectedToken, &token)),
            }
        }

        debug!(count = tags.len(), "parsed tag list");
        Ok(tags)
    }
}

/// Parse a tag list with the default options.
pub fn parse_tag_list(input: &str) -> Result<Vec<String>, QueryError> {
    TagListParser::default().parse_as_vec(input)
}
