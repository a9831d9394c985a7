//! Evaluator for tag query expressions.

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

use super::ast::{Expression, Pattern};
use super::visitor::Visitor;
use crate::config::MatchOptions;

/// The tags that apply to one item.
pub trait TagSet {
    /// Whether `tag` applies, compared exactly.
    fn has_tag(&self, tag: &str) -> bool;

    /// Every tag that applies.
    fn tags(&self) -> impl Iterator<Item = &str>;
}

impl<S, H> TagSet for HashSet<S, H>
where
    S: Borrow<str> + Eq + Hash,
    H: BuildHasher,
{
    fn has_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }

    fn tags(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|tag| -> &str { tag.borrow() })
    }
}

impl<S: Borrow<str> + Ord> TagSet for BTreeSet<S> {
    fn has_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }

    fn tags(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|tag| -> &str { tag.borrow() })
    }
}

impl<S: AsRef<str>> TagSet for [S] {
    fn has_tag(&self, tag: &str) -> bool {
        self.iter().any(|t| t.as_ref() == tag)
    }

    fn tags(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|tag| tag.as_ref())
    }
}

impl<S: AsRef<str>, const N: usize> TagSet for [S; N] {
    fn has_tag(&self, tag: &str) -> bool {
        self.as_slice().has_tag(tag)
    }

    fn tags(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|tag| tag.as_ref())
    }
}

impl<S: AsRef<str>> TagSet for Vec<S> {
    fn has_tag(&self, tag: &str) -> bool {
        self.as_slice().has_tag(tag)
    }

    fn tags(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|tag| tag.as_ref())
    }
}

/// Visitor evaluating an expression against one tag set.
pub struct Matcher<'t, T: TagSet + ?Sized> {
    tags: &'t T,
    options: MatchOptions,
}

impl<'t, T: TagSet + ?Sized> Matcher<'t, T> {
    pub fn new(tags: &'t T, options: MatchOptions) -> Self {
        Matcher { tags, options }
    }
}

impl<T: TagSet + ?Sized> Visitor for Matcher<'_, T> {
    type Output = bool;

    fn visit_empty(&mut self) -> bool {
        self.options.empty_matches_all
    }

    fn visit_tag(&mut self, name: &str) -> bool {
        if self.options.case_sensitive {
            self.tags.has_tag(name)
        } else {
            let wanted = name.to_lowercase();
            self.tags.tags().any(|tag| tag.to_lowercase() == wanted)
        }
    }

    fn visit_pattern(&mut self, pattern: &Pattern) -> bool {
        if self.options.case_sensitive {
            self.tags.tags().any(|tag| pattern.is_match(tag))
        } else {
            let lowered = pattern.to_lowercase();
            self.tags
                .tags()
                .any(|tag| lowered.is_match(&tag.to_lowercase()))
        }
    }

    fn visit_and(&mut self, operands: &[Expression]) -> bool {
        operands.iter().all(|operand| operand.accept(self))
    }

    fn visit_or(&mut self, operands: &[Expression]) -> bool {
        operands.iter().any(|operand| operand.accept(self))
    }

    fn visit_not(&mut self, operand: &Expression) -> bool {
        !operand.accept(self)
    }
}

/// Evaluate an expression against a set of tags with default options.
pub fn matches<T: TagSet + ?Sized>(expr: &Expression, tags: &T) -> bool {
    matches_with(expr, tags, MatchOptions::default())
}

/// Evaluate an expression against a set of tags.
pub fn matches_with<T: TagSet + ?Sized>(expr: &Expression, tags: &T, options: MatchOptions) -> bool {
    expr.accept(&mut Matcher::new(tags, options))
}
