//! AST types for tag query expressions.

use std::fmt;

use super::render::Renderer;

/// Root query expression.
///
/// Built once by the parser and read-only afterwards; every interpretation
/// goes through [`Expression::accept`] with a [`Visitor`](super::Visitor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Successfully parsed empty input
    Empty,

    /// Exact tag: `urgent`
    Tag(String),

    /// Tag pattern with wildcards: `bug*`
    Pattern(Pattern),

    /// All operands match: `a AND b AND c`
    ///
    /// Needs at least one operand. An empty list has no textual form, so its
    /// rendering does not parse back to the same tree.
    And(Vec<Expression>),

    /// Any operand matches: `a OR b OR c`
    ///
    /// Needs at least one operand, as for `And`.
    Or(Vec<Expression>),

    /// Operand does not match: `NOT a`
    Not(Box<Expression>),
}

impl Expression {
    pub fn tag(name: impl Into<String>) -> Self {
        Expression::Tag(name.into())
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Not(Box::new(operand))
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::And(operands) | Expression::Or(operands) => operands,
            Expression::Not(operand) => std::slice::from_ref(&**operand),
            Expression::Empty | Expression::Tag(_) | Expression::Pattern(_) => &[],
        }
    }
}

/// Renders with the default `*` marker. Trees parsed with another marker
/// should be printed with [`Renderer::new`] and the same [`ParserOptions`].
///
/// [`ParserOptions`]: crate::config::ParserOptions
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Renderer::default().render(self))
    }
}

/// One piece of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Text that must appear verbatim
    Literal(String),
    /// Any run of characters, including none
    Wildcard,
}

/// A tag name containing wildcards, split into literal runs and wildcard gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<PatternSegment>,
}

impl Pattern {
    /// Build a pattern, merging adjacent literal segments and dropping empty
    /// ones.
    pub fn new(segments: impl IntoIterator<Item = PatternSegment>) -> Self {
        let mut merged: Vec<PatternSegment> = Vec::new();
        for segment in segments {
            match segment {
                PatternSegment::Literal(text) if text.is_empty() => {}
                PatternSegment::Literal(text) => match merged.last_mut() {
                    Some(PatternSegment::Literal(prev)) => prev.push_str(&text),
                    _ => merged.push(PatternSegment::Literal(text)),
                },
                PatternSegment::Wildcard => merged.push(PatternSegment::Wildcard),
            }
        }
        Pattern { segments: merged }
    }

    /// Split `text` on every occurrence of `wildcard`.
    pub fn from_text(text: &str, wildcard: char) -> Self {
        let mut segments = Vec::new();
        for (i, part) in text.split(wildcard).enumerate() {
            if i > 0 {
                segments.push(PatternSegment::Wildcard);
            }
            segments.push(PatternSegment::Literal(part.to_string()));
        }
        Pattern::new(segments)
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Write the pattern back as text using `wildcard` for each gap.
    pub fn to_text(&self, wildcard: char) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(text) => out.push_str(text),
                PatternSegment::Wildcard => out.push(wildcard),
            }
        }
        out
    }

    /// Lowercased copy, for case-insensitive matching.
    pub fn to_lowercase(&self) -> Self {
        Pattern::new(self.segments.iter().map(|segment| match segment {
            PatternSegment::Literal(text) => PatternSegment::Literal(text.to_lowercase()),
            PatternSegment::Wildcard => PatternSegment::Wildcard,
        }))
    }

    /// Whether the whole of `candidate` matches, anchored at both ends.
    pub fn is_match(&self, candidate: &str) -> bool {
        let mut rest = candidate;
        let mut anchored = true;
        let last = self.segments.len().saturating_sub(1);

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PatternSegment::Wildcard => anchored = false,
                PatternSegment::Literal(text) if anchored => match rest.strip_prefix(text.as_str()) {
                    Some(tail) => rest = tail,
                    None => return false,
                },
                // A floating final literal has to sit at the very end.
                PatternSegment::Literal(text) if i == last => return rest.ends_with(text.as_str()),
                PatternSegment::Literal(text) => match rest.find(text.as_str()) {
                    Some(idx) => {
                        rest = &rest[idx + text.len()..];
                        anchored = true;
                    }
                    None => return false,
                },
            }
        }

        !anchored || rest.is_empty()
    }
}

/// The two variadic connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Connective {
    And,
    Or,
}

/// Accumulates the operands of a same-operator chain while parsing, then
/// freezes them into a single node.
pub(crate) struct ChainBuilder {
    connective: Connective,
    operands: Vec<Expression>,
}

impl ChainBuilder {
    pub(crate) fn new(connective: Connective, first: Expression) -> Self {
        ChainBuilder {
            connective,
            operands: vec![first],
        }
    }

    pub(crate) fn add(&mut self, operand: Expression) {
        self.operands.push(operand);
    }

    /// A chain of one is just its operand.
    pub(crate) fn finish(mut self) -> Expression {
        if self.operands.len() == 1 {
            if let Some(only) = self.operands.pop() {
                return only;
            }
        }
        match self.connective {
            Connective::And => Expression::And(self.operands),
            Connective::Or => Expression::Or(self.operands),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> PatternSegment {
        PatternSegment::Literal(text.into())
    }

    #[test]
    fn test_pattern_merges_adjacent_literals() {
        let pattern = Pattern::new(vec![
            lit("foo"),
            lit(""),
            lit("bar"),
            PatternSegment::Wildcard,
            lit("baz"),
        ]);
        assert_eq!(
            pattern.segments(),
            &[lit("foobar"), PatternSegment::Wildcard, lit("baz")]
        );
    }

    #[test]
    fn test_pattern_from_text() {
        let pattern = Pattern::from_text("*bug*fix", '*');
        assert_eq!(
            pattern.segments(),
            &[
                PatternSegment::Wildcard,
                lit("bug"),
                PatternSegment::Wildcard,
                lit("fix"),
            ]
        );
        assert_eq!(pattern.to_text('*'), "*bug*fix");
        assert_eq!(pattern.to_text('%'), "%bug%fix");
    }

    #[test]
    fn test_pattern_anchoring() {
        let prefix = Pattern::from_text("bug*", '*');
        assert!(prefix.is_match("bug"));
        assert!(prefix.is_match("bugfix"));
        assert!(!prefix.is_match("abug"));

        let contains = Pattern::from_text("*bug*", '*');
        assert!(contains.is_match("abugz"));
        assert!(contains.is_match("bug"));
        assert!(!contains.is_match("bu-g"));

        let suffix = Pattern::from_text("*_link", '*');
        assert!(suffix.is_match("motorway_link"));
        assert!(!suffix.is_match("motorway_links"));
    }

    #[test]
    fn test_pattern_middle_wildcards() {
        let pattern = Pattern::from_text("a*b*c", '*');
        assert!(pattern.is_match("abc"));
        assert!(pattern.is_match("axxbyyc"));
        assert!(pattern.is_match("abcbc"));
        assert!(!pattern.is_match("acb"));
        assert!(!pattern.is_match("abcd"));

        // The final literal must not overlap text consumed earlier.
        let overlap = Pattern::from_text("ab*ba", '*');
        assert!(!overlap.is_match("aba"));
        assert!(overlap.is_match("abba"));
    }

    #[test]
    fn test_lone_wildcard_matches_anything() {
        let pattern = Pattern::from_text("*", '*');
        assert_eq!(pattern.segments(), &[PatternSegment::Wildcard]);
        assert!(pattern.is_match(""));
        assert!(pattern.is_match("anything"));
    }

    #[test]
    fn test_chain_builder_flattens() {
        let mut chain = ChainBuilder::new(Connective::And, Expression::tag("a"));
        chain.add(Expression::tag("b"));
        chain.add(Expression::tag("c"));
        assert_eq!(
            chain.finish(),
            Expression::And(vec![
                Expression::tag("a"),
                Expression::tag("b"),
                Expression::tag("c"),
            ])
        );

        let single = ChainBuilder::new(Connective::Or, Expression::tag("a"));
        assert_eq!(single.finish(), Expression::tag("a"));
    }

    #[test]
    fn test_children() {
        let expr = Expression::not(Expression::tag("a"));
        assert_eq!(expr.children(), &[Expression::tag("a")]);
        assert!(Expression::Empty.children().is_empty());
    }
}
