//! JOIN clause types.

use crate::condition::Condition;
use crate::query::{Query, TableRef};

/// Types of SQL joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// SQL keyword for this join kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// What a join reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinTarget {
    /// A table, declared or named
    Table(TableRef),
    /// A nested query; its parameters are spliced in position
    Query(Box<Query>),
    /// A raw table expression written verbatim
    Raw(String),
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub target: JoinTarget,
    pub alias: Option<String>,
    /// ON condition; must render to at least one predicate
    pub on: Condition,
}

impl Join {
    pub fn new(kind: JoinKind, target: JoinTarget, on: Condition) -> Self {
        Self {
            kind,
            target,
            alias: None,
            on,
        }
    }

    /// INNER JOIN a table.
    pub fn inner(table: impl Into<TableRef>, on: Condition) -> Self {
        Self::new(JoinKind::Inner, JoinTarget::Table(table.into()), on)
    }

    /// LEFT JOIN a table.
    pub fn left(table: impl Into<TableRef>, on: Condition) -> Self {
        Self::new(JoinKind::Left, JoinTarget::Table(table.into()), on)
    }

    /// RIGHT JOIN a table.
    pub fn right(table: impl Into<TableRef>, on: Condition) -> Self {
        Self::new(JoinKind::Right, JoinTarget::Table(table.into()), on)
    }

    /// FULL JOIN a table.
    pub fn full(table: impl Into<TableRef>, on: Condition) -> Self {
        Self::new(JoinKind::Full, JoinTarget::Table(table.into()), on)
    }

    /// Join a nested query.
    pub fn query(kind: JoinKind, query: Query, on: Condition) -> Self {
        Self::new(kind, JoinTarget::Query(Box::new(query)), on)
    }

    /// Join a raw table expression.
    pub fn raw(kind: JoinKind, sql: impl Into<String>, on: Condition) -> Self {
        Self::new(kind, JoinTarget::Raw(sql.into()), on)
    }

    /// Set the table alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::expr::{Expression, Operator};

    #[test]
    fn test_join_kinds() {
        assert_eq!(JoinKind::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinKind::Left.as_str(), "LEFT JOIN");
        assert_eq!(JoinKind::Right.as_str(), "RIGHT JOIN");
        assert_eq!(JoinKind::Full.as_str(), "FULL JOIN");
    }

    #[test]
    fn test_join_builder() {
        let on = Condition::from(Expression::columns(
            Column::of("o", "user_id"),
            Operator::Eq,
            Column::of("u", "id"),
        ));
        let join = Join::left("orders", on.clone()).alias("o");
        assert_eq!(join.kind, JoinKind::Left);
        assert_eq!(join.alias.as_deref(), Some("o"));
        assert_eq!(join.on, on);
        assert!(matches!(join.target, JoinTarget::Table(ref t) if t.name == "orders"));
    }
}
