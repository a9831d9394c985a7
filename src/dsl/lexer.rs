//! Lexer/tokenizer for tag query expressions.

use tracing::trace;
use winnow::combinator::alt;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use super::error::LexError;
use crate::config::ParserOptions;

/// Token types for the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare or quoted tag text
    String,

    // Connectives (case-insensitive keywords)
    And,
    Or,
    Not,

    // Punctuation
    LParen,
    RParen,

    /// A bare word consisting only of the wildcard marker
    Wildcard,

    End,
}

/// A token together with its source text and starting position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Unescaped text of the token; empty for `End`.
    pub value: String,
    /// Character offset at which the token starts.
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            offset,
        }
    }
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, ErrMode<ContextError>>;

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn whitespace<'i>(input: &mut &'i str) -> PResult<&'i str> {
    take_while(0.., char::is_whitespace).parse_next(input)
}

/// A parenthesis or a run of non-separator characters.
fn word<'i>(input: &mut &'i str) -> PResult<&'i str> {
    alt(("(", ")", take_while(1.., is_word_char))).parse_next(input)
}

fn quote_char(input: &mut &str) -> PResult<char> {
    one_of(['"', '\'']).parse_next(input)
}

fn next_char(input: &mut &str) -> PResult<char> {
    any.parse_next(input)
}

/// Lex a quoted literal. Backslash escapes the active quote and itself; any
/// other escaped character keeps its backslash.
fn lex_quoted(input: &mut &str) -> PResult<String> {
    let quote = quote_char(input)?;
    let mut value = String::new();

    loop {
        match next_char(input)? {
            '\\' => {
                let escaped = next_char(input)?;
                if escaped != quote && escaped != '\\' {
                    value.push('\\');
                }
                value.push(escaped);
            }
            c if c == quote => return Ok(value),
            c => value.push(c),
        }
    }
}

/// Whether `text` would lex as a connective keyword when left unquoted.
pub fn is_keyword(text: &str) -> bool {
    ["and", "or", "not"]
        .iter()
        .any(|keyword| text.eq_ignore_ascii_case(keyword))
}

fn classify(text: &str, wildcard: char) -> TokenKind {
    match text {
        "(" => TokenKind::LParen,
        ")" => TokenKind::RParen,
        _ if text.eq_ignore_ascii_case("and") => TokenKind::And,
        _ if text.eq_ignore_ascii_case("or") => TokenKind::Or,
        _ if text.eq_ignore_ascii_case("not") => TokenKind::Not,
        _ if text.strip_prefix(wildcard) == Some("") => TokenKind::Wildcard,
        _ => TokenKind::String,
    }
}

/// Lazy token stream over an input string.
///
/// Yields every token up to and including a single `End`, then `None`. A
/// lexer error also ends the stream.
pub struct Lexer<'a> {
    remaining: &'a str,
    offset: usize,
    wildcard: char,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, options: &ParserOptions) -> Self {
        Lexer {
            remaining: input,
            offset: 0,
            wildcard: options.wildcard,
            done: false,
        }
    }

    /// Lex the next token. Once the input is exhausted this keeps returning
    /// `End`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let before = self.remaining;
        let _ = whitespace(&mut self.remaining);
        self.advance_from(before);

        let start = self.offset;
        let before = self.remaining;
        let token = match before.chars().next() {
            None => Token::new(TokenKind::End, "", start),
            Some('"' | '\'') => {
                let value =
                    lex_quoted(&mut self.remaining).map_err(|_| LexError { offset: start })?;
                Token::new(TokenKind::String, value, start)
            }
            Some(_) => {
                // Cannot fail: leading whitespace is gone and the input is non-empty.
                let text = word(&mut self.remaining).map_err(|_| LexError { offset: start })?;
                Token::new(classify(text, self.wildcard), text, start)
            }
        };
        self.advance_from(before);

        trace!(kind = ?token.kind, offset = token.offset, value = %token.value, "lexed token");
        Ok(token)
    }

    fn advance_from(&mut self, before: &str) {
        let consumed = &before[..before.len() - self.remaining.len()];
        self.offset += consumed.chars().count();
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        if !matches!(&result, Ok(token) if token.kind != TokenKind::End) {
            self.done = true;
        }
        Some(result)
    }
}

/// Tokenize the entire input.
pub fn tokenize(input: &str, options: &ParserOptions) -> Result<Vec<Token>, LexError> {
    Lexer::new(input, options).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input, &ParserOptions::default())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("urgent AND bug*", &ParserOptions::default()).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::String, "urgent", 0),
                Token::new(TokenKind::And, "AND", 7),
                Token::new(TokenKind::String, "bug*", 11),
                Token::new(TokenKind::End, "", 15),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive_whole_words() {
        assert_eq!(
            kinds("a and b Or NOT c android"),
            vec![
                TokenKind::String,
                TokenKind::And,
                TokenKind::String,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::String,
                TokenKind::String,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_parentheses_split_words() {
        assert_eq!(
            kinds("(a)OR(b)"),
            vec![
                TokenKind::LParen,
                TokenKind::String,
                TokenKind::RParen,
                TokenKind::Or,
                TokenKind::LParen,
                TokenKind::String,
                TokenKind::RParen,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_quoted_literals() {
        let tokens = tokenize(r#""two words" 'a(b)' "AND" "say \"hi\"""#, &ParserOptions::default())
            .unwrap();
        let values: Vec<_> = tokens.iter().map(|t| (t.kind, t.value.as_str())).collect();
        assert_eq!(
            values,
            vec![
                (TokenKind::String, "two words"),
                (TokenKind::String, "a(b)"),
                (TokenKind::String, "AND"),
                (TokenKind::String, r#"say "hi""#),
                (TokenKind::End, ""),
            ]
        );
    }

    #[test]
    fn test_escapes_inside_quotes() {
        let tokens = tokenize(r#"'it\'s' "a\\b" "c\d""#, &ParserOptions::default()).unwrap();
        assert_eq!(tokens[0].value, "it's");
        assert_eq!(tokens[1].value, r"a\b");
        assert_eq!(tokens[2].value, r"c\d");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize(r#"a OR "open"#, &ParserOptions::default()).unwrap_err();
        assert_eq!(err, LexError { offset: 5 });

        let err = tokenize(r#"'trailing\"#, &ParserOptions::default()).unwrap_err();
        assert_eq!(err, LexError { offset: 0 });
    }

    #[test]
    fn test_wildcard_marker() {
        assert_eq!(
            kinds("* *bug b*g"),
            vec![
                TokenKind::Wildcard,
                TokenKind::String,
                TokenKind::String,
                TokenKind::End,
            ]
        );

        let options = ParserOptions { wildcard: '%' };
        let tokens = tokenize("% *", &options).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Wildcard);
        assert_eq!(tokens[1].kind, TokenKind::String);
    }

    #[test]
    fn test_offsets_count_characters() {
        let tokens = tokenize("été  OR ö", &ParserOptions::default()).unwrap();
        let offsets: Vec<_> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 5, 8, 9]);
    }

    #[test]
    fn test_iterator_ends_after_single_end() {
        let mut lexer = Lexer::new("  ", &ParserOptions::default());
        assert_eq!(
            lexer.next().unwrap().unwrap(),
            Token::new(TokenKind::End, "", 2)
        );
        assert!(lexer.next().is_none());
    }
}
