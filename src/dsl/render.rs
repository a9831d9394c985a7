//! Canonical text rendering of expressions.

use super::ast::{Expression, Pattern};
use super::lexer::is_keyword;
use super::visitor::Visitor;
use crate::config::ParserOptions;

/// Renders an expression in a form the parser reads back to an equivalent
/// tree. Connectives are uppercase, names are quoted only when needed and
/// parentheses appear only where precedence requires them.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    wildcard: char,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new(&ParserOptions::default())
    }
}

impl Renderer {
    pub fn new(options: &ParserOptions) -> Self {
        Renderer {
            wildcard: options.wildcard,
        }
    }

    pub fn render(&mut self, expr: &Expression) -> String {
        expr.accept(self)
    }

    fn operand(&mut self, operand: &Expression, parent: Parent) -> String {
        let operand = collapse(operand);
        let needs_parens = match (parent, operand) {
            (Parent::And, Expression::Or(_)) => true,
            (Parent::Not, Expression::And(_) | Expression::Or(_)) => true,
            _ => false,
        };

        let text = operand.accept(self);
        if needs_parens {
            format!("({text})")
        } else {
            text
        }
    }

    fn join(&mut self, operands: &[Expression], parent: Parent, keyword: &str) -> String {
        operands
            .iter()
            .map(|operand| self.operand(operand, parent))
            .collect::<Vec<_>>()
            .join(keyword)
    }
}

#[derive(Debug, Clone, Copy)]
enum Parent {
    And,
    Or,
    Not,
}

/// Single-operand connectives render as their operand.
fn collapse(expr: &Expression) -> &Expression {
    match expr {
        Expression::And(operands) | Expression::Or(operands) if operands.len() == 1 => {
            collapse(&operands[0])
        }
        _ => expr,
    }
}

fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || is_keyword(text)
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | '\\'))
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn name(text: &str) -> String {
    if needs_quotes(text) {
        quote(text)
    } else {
        text.to_string()
    }
}

impl Visitor for Renderer {
    type Output = String;

    fn visit_empty(&mut self) -> String {
        String::new()
    }

    fn visit_tag(&mut self, tag: &str) -> String {
        name(tag)
    }

    fn visit_pattern(&mut self, pattern: &Pattern) -> String {
        name(&pattern.to_text(self.wildcard))
    }

    fn visit_and(&mut self, operands: &[Expression]) -> String {
        self.join(operands, Parent::And, " AND ")
    }

    fn visit_or(&mut self, operands: &[Expression]) -> String {
        self.join(operands, Parent::Or, " OR ")
    }

    fn visit_not(&mut self, operand: &Expression) -> String {
        format!("NOT {}", self.operand(operand, Parent::Not))
    }
}

/// Render with the default wildcard marker.
pub fn render(expr: &Expression) -> String {
    Renderer::default().render(expr)
}
