//! Condition trees and their rendering.
//!
//! A [`Condition`] is an ordered list of entries. Each entry names how its
//! payload joins the text rendered so far; entries are folded left to right
//! and earlier text is never reordered, so precedence is whatever the
//! author wrote.
//!
//! # Example
//!
//! ```ignore
//! let cond = Condition::new()
//!     .and(Expression::eq("status", "active"))
//!     .and_or(vec![Expression::lt("age", 18), Expression::gt("age", 65)]);
//! // " status = ? AND (age < ? OR age > ?)"
//! ```

use crate::context::RenderContext;
use crate::expr::Expression;
use serde::{Deserialize, Serialize};
use sqlbridge_core::{Result, Value};

/// How an entry joins the text rendered before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    /// `... AND payload`
    And,
    /// `... OR payload`
    Or,
    /// `... AND (e1 OR e2 ...)`
    AndOr,
    /// `... OR (e1 AND e2 ...)`
    OrAnd,
    /// `... OR (e1 OR e2 ...)`
    OrOr,
}

impl Combinator {
    /// Keyword splicing the payload into the running text.
    const fn splice(&self) -> &'static str {
        match self {
            Combinator::And | Combinator::AndOr => " AND ",
            Combinator::Or | Combinator::OrAnd | Combinator::OrOr => " OR ",
        }
    }

    /// Keyword joining the members of a group payload.
    const fn inner(&self) -> &'static str {
        match self {
            Combinator::AndOr | Combinator::OrOr | Combinator::Or => " OR ",
            Combinator::OrAnd | Combinator::And => " AND ",
        }
    }
}

/// Payload of one condition entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Expression(Expression),
    /// Nested condition, parenthesized when rendered
    Condition(Condition),
    /// Pre-rendered fragment with its own parameters
    Sql { sql: String, params: Vec<Value> },
    /// Members of a group combinator
    Group(Vec<Expression>),
}

/// One entry of a condition list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionEntry {
    pub combinator: Combinator,
    pub clause: Clause,
}

/// An ordered list of combinator entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub entries: Vec<ConditionEntry>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append an entry.
    pub fn push(mut self, combinator: Combinator, clause: Clause) -> Self {
        self.entries.push(ConditionEntry { combinator, clause });
        self
    }

    pub fn and(self, expr: Expression) -> Self {
        self.push(Combinator::And, Clause::Expression(expr))
    }

    pub fn or(self, expr: Expression) -> Self {
        self.push(Combinator::Or, Clause::Expression(expr))
    }

    /// AND a nested condition, rendered in parentheses.
    pub fn and_nested(self, condition: Condition) -> Self {
        self.push(Combinator::And, Clause::Condition(condition))
    }

    /// OR a nested condition, rendered in parentheses.
    pub fn or_nested(self, condition: Condition) -> Self {
        self.push(Combinator::Or, Clause::Condition(condition))
    }

    /// `AND (e1 OR e2 ...)`.
    pub fn and_or(self, exprs: Vec<Expression>) -> Self {
        self.push(Combinator::AndOr, Clause::Group(exprs))
    }

    /// `OR (e1 AND e2 ...)`.
    pub fn or_and(self, exprs: Vec<Expression>) -> Self {
        self.push(Combinator::OrAnd, Clause::Group(exprs))
    }

    /// `OR (e1 OR e2 ...)`.
    pub fn or_or(self, exprs: Vec<Expression>) -> Self {
        self.push(Combinator::OrOr, Clause::Group(exprs))
    }

    /// AND a raw SQL fragment whose `?` placeholders bind `params`.
    pub fn and_sql(self, sql: impl Into<String>, params: Vec<Value>) -> Self {
        self.push(
            Combinator::And,
            Clause::Sql {
                sql: sql.into(),
                params,
            },
        )
    }

    /// OR a raw SQL fragment whose `?` placeholders bind `params`.
    pub fn or_sql(self, sql: impl Into<String>, params: Vec<Value>) -> Self {
        self.push(
            Combinator::Or,
            Clause::Sql {
                sql: sql.into(),
                params,
            },
        )
    }

    /// Apply `f` to every expression in the tree.
    pub(crate) fn map_expressions(&self, f: &mut impl FnMut(&Expression) -> Expression) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|entry| ConditionEntry {
                combinator: entry.combinator,
                clause: match &entry.clause {
                    Clause::Expression(e) => Clause::Expression(f(e)),
                    Clause::Condition(c) => Clause::Condition(c.map_expressions(f)),
                    Clause::Group(exprs) => Clause::Group(exprs.iter().map(&mut *f).collect()),
                    Clause::Sql { sql, params } => Clause::Sql {
                        sql: sql.clone(),
                        params: params.clone(),
                    },
                },
            })
            .collect();
        Self { entries }
    }
}

impl From<Expression> for Condition {
    fn from(expr: Expression) -> Self {
        Condition::new().and(expr)
    }
}

/// Render a condition into a fragment with a leading space, or `""`.
///
/// The first rendered entry's combinator keyword is dropped. Entries that
/// render to nothing (null operands, empty IN lists, empty groups) are
/// skipped without leaving dangling keywords.
pub fn render_conditions(ctx: &mut RenderContext<'_>, condition: &Condition) -> Result<String> {
    let body = render_body(ctx, condition)?;
    Ok(body.map_or_else(String::new, |body| format!(" {}", body)))
}

fn render_body(ctx: &mut RenderContext<'_>, condition: &Condition) -> Result<Option<String>> {
    let mut out = String::new();
    for entry in &condition.entries {
        let Some(part) = render_clause(ctx, entry)? else {
            continue;
        };
        if !out.is_empty() {
            out.push_str(entry.combinator.splice());
        }
        out.push_str(&part);
    }
    Ok((!out.is_empty()).then_some(out))
}

fn render_clause(ctx: &mut RenderContext<'_>, entry: &ConditionEntry) -> Result<Option<String>> {
    match &entry.clause {
        Clause::Expression(expr) => expr.render(ctx),
        Clause::Condition(nested) => {
            Ok(render_body(ctx, nested)?.map(|body| format!("({})", body)))
        }
        Clause::Sql { sql, params } => {
            if sql.trim().is_empty() {
                return Ok(None);
            }
            for value in params {
                ctx.push_raw(value.clone());
            }
            Ok(Some(sql.trim().to_string()))
        }
        Clause::Group(exprs) => {
            let mut parts = Vec::with_capacity(exprs.len());
            for expr in exprs {
                if let Some(part) = expr.render(ctx)? {
                    parts.push(part);
                }
            }
            Ok(match parts.len() {
                0 => None,
                _ => Some(format!("({})", parts.join(entry.combinator.inner()))),
            })
        }
    }
}
