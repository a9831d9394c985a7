//! Double dispatch over [`Expression`] nodes.

use std::collections::BTreeSet;

use super::ast::{Expression, Pattern};

/// One interpretation of an expression tree.
///
/// Each node calls exactly one of these methods from
/// [`Expression::accept`] and hands back its result unchanged. Visitors
/// recurse by calling `accept` on the children they are given.
pub trait Visitor {
    type Output;

    fn visit_empty(&mut self) -> Self::Output;
    fn visit_tag(&mut self, name: &str) -> Self::Output;
    fn visit_pattern(&mut self, pattern: &Pattern) -> Self::Output;
    fn visit_and(&mut self, operands: &[Expression]) -> Self::Output;
    fn visit_or(&mut self, operands: &[Expression]) -> Self::Output;
    fn visit_not(&mut self, operand: &Expression) -> Self::Output;
}

impl Expression {
    /// Dispatch to the visitor method matching this node.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expression::Empty => visitor.visit_empty(),
            Expression::Tag(name) => visitor.visit_tag(name),
            Expression::Pattern(pattern) => visitor.visit_pattern(pattern),
            Expression::And(operands) => visitor.visit_and(operands),
            Expression::Or(operands) => visitor.visit_or(operands),
            Expression::Not(operand) => visitor.visit_not(operand),
        }
    }
}

/// Collects the distinct plain tag names an expression mentions.
#[derive(Debug, Default)]
pub struct TagCollector {
    tags: BTreeSet<String>,
}

impl TagCollector {
    pub fn into_tags(self) -> Vec<String> {
        self.tags.into_iter().collect()
    }
}

impl Visitor for TagCollector {
    type Output = ();

    fn visit_empty(&mut self) {}

    fn visit_tag(&mut self, name: &str) {
        self.tags.insert(name.to_string());
    }

    fn visit_pattern(&mut self, _pattern: &Pattern) {}

    fn visit_and(&mut self, operands: &[Expression]) {
        operands.iter().for_each(|operand| operand.accept(self));
    }

    fn visit_or(&mut self, operands: &[Expression]) {
        operands.iter().for_each(|operand| operand.accept(self));
    }

    fn visit_not(&mut self, operand: &Expression) {
        operand.accept(self)
    }
}

/// Sorted, de-duplicated tag names referenced anywhere in `expr`.
pub fn referenced_tags(expr: &Expression) -> Vec<String> {
    let mut collector = TagCollector::default();
    expr.accept(&mut collector);
    collector.into_tags()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::PatternSegment;

    /// Records which visit method fired.
    struct Probe;

    impl Visitor for Probe {
        type Output = &'static str;

        fn visit_empty(&mut self) -> &'static str {
            "empty"
        }
        fn visit_tag(&mut self, _name: &str) -> &'static str {
            "tag"
        }
        fn visit_pattern(&mut self, _pattern: &Pattern) -> &'static str {
            "pattern"
        }
        fn visit_and(&mut self, _operands: &[Expression]) -> &'static str {
            "and"
        }
        fn visit_or(&mut self, _operands: &[Expression]) -> &'static str {
            "or"
        }
        fn visit_not(&mut self, _operand: &Expression) -> &'static str {
            "not"
        }
    }

    #[test]
    fn test_accept_dispatches_by_variant() {
        let cases = [
            (Expression::Empty, "empty"),
            (Expression::tag("a"), "tag"),
            (
                Expression::Pattern(Pattern::new([PatternSegment::Wildcard])),
                "pattern",
            ),
            (Expression::And(vec![Expression::tag("a")]), "and"),
            (Expression::Or(vec![Expression::tag("a")]), "or"),
            (Expression::not(Expression::tag("a")), "not"),
        ];

        for (expr, expected) in cases {
            assert_eq!(expr.accept(&mut Probe), expected);
        }
    }

    #[test]
    fn test_referenced_tags() {
        let expr = Expression::And(vec![
            Expression::tag("urgent"),
            Expression::Or(vec![
                Expression::Pattern(Pattern::from_text("bug*", '*')),
                Expression::tag("regression"),
            ]),
            Expression::not(Expression::tag("closed")),
            Expression::tag("urgent"),
        ]);
        assert_eq!(
            referenced_tags(&expr),
            vec!["closed", "regression", "urgent"]
        );
    }
}
