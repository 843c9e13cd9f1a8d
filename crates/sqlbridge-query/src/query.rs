//! Query shapes and the query builder.
//!
//! Two shapes share one struct: a single-table query (`FromClause::Single`)
//! and a multi-table query over aliased tables or sub-queries
//! (`FromClause::Multi`). Both carry the same joins, conditions, grouping
//! and ordering.

use crate::clause::{Direction, Order};
use crate::column::{Column, Projection};
use crate::condition::Condition;
use crate::expr::Expression;
use crate::join::Join;
use sqlbridge_core::{CaseSensitivity, TableMeta};
use std::sync::Arc;

/// A table named in FROM or JOIN.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    /// Casing mode used when the name is written into SQL
    pub sensitivity: CaseSensitivity,
    /// Declared metadata, when the table is a declared type
    pub meta: Option<Arc<TableMeta>>,
}

impl TableRef {
    /// A table known only by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sensitivity: CaseSensitivity::Default,
            meta: None,
        }
    }

    /// A declared table; name and casing come from its metadata.
    pub fn declared(meta: Arc<TableMeta>) -> Self {
        Self {
            name: meta.name.clone(),
            sensitivity: meta.sensitivity,
            meta: Some(meta),
        }
    }

    pub fn sensitivity(mut self, sensitivity: CaseSensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::new(name)
    }
}

impl From<Arc<TableMeta>> for TableRef {
    fn from(meta: Arc<TableMeta>) -> Self {
        TableRef::declared(meta)
    }
}

/// Source of one entry of a multi-table FROM list.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(TableRef),
    Query(Box<Query>),
}

/// A FROM entry with its alias.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedTable {
    pub source: TableSource,
    pub alias: String,
}

impl AliasedTable {
    pub fn table(table: impl Into<TableRef>, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Table(table.into()),
            alias: alias.into(),
        }
    }

    pub fn query(query: Query, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Query(Box::new(query)),
            alias: alias.into(),
        }
    }
}

/// The FROM clause of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum FromClause {
    Single {
        table: TableRef,
        alias: Option<String>,
    },
    Multi(Vec<AliasedTable>),
}

/// A SELECT query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub from: FromClause,
    pub distinct: bool,
    /// Explicit projections; empty means `alias.*` or `*`
    pub columns: Vec<Projection>,
    pub joins: Vec<Join>,
    pub condition: Condition,
    pub group_by: Vec<Column>,
    pub having: Condition,
    pub orders: Vec<Order>,
}

impl Query {
    fn with_from(from: FromClause) -> Self {
        Self {
            from,
            distinct: false,
            columns: Vec::new(),
            joins: Vec::new(),
            condition: Condition::new(),
            group_by: Vec::new(),
            having: Condition::new(),
            orders: Vec::new(),
        }
    }

    /// Single-table query.
    pub fn table(table: impl Into<TableRef>) -> Self {
        Self::with_from(FromClause::Single {
            table: table.into(),
            alias: None,
        })
    }

    /// Multi-table query over aliased tables or sub-queries.
    pub fn multi(tables: Vec<AliasedTable>) -> Self {
        Self::with_from(FromClause::Multi(tables))
    }

    /// Alias the table of a single-table query.
    ///
    /// Has no effect on multi-table queries, whose entries carry their own.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let FromClause::Single { alias: slot, .. } = &mut self.from {
            *slot = Some(alias.into());
        }
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn column(mut self, projection: impl Into<Projection>) -> Self {
        self.columns.push(projection.into());
        self
    }

    pub fn columns<I, P>(mut self, projections: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        self.columns.extend(projections.into_iter().map(Into::into));
        self
    }

    /// Add a scalar subquery projection.
    pub fn subquery_column(mut self, query: Query, as_name: impl Into<String>) -> Self {
        self.columns.push(Projection::Query {
            query: Box::new(query),
            as_name: as_name.into(),
        });
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Replace the WHERE condition.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// AND an expression onto WHERE.
    pub fn and(mut self, expr: Expression) -> Self {
        self.condition = self.condition.and(expr);
        self
    }

    /// OR an expression onto WHERE.
    pub fn or(mut self, expr: Expression) -> Self {
        self.condition = self.condition.or(expr);
        self
    }

    pub fn group_by(mut self, column: impl Into<Column>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn having(mut self, condition: Condition) -> Self {
        self.having = condition;
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn asc(self, column: impl Into<Column>) -> Self {
        self.order_by(Order::new(column, Direction::Asc))
    }

    pub fn desc(self, column: impl Into<Column>) -> Self {
        self.order_by(Order::new(column, Direction::Desc))
    }

    /// The alias unqualified columns inherit, if the query has exactly one.
    ///
    /// That is the single table's alias, or the alias of the only entry of a
    /// multi-table query.
    pub fn implicit_alias(&self) -> Option<&str> {
        match &self.from {
            FromClause::Single { alias, .. } => alias.as_deref(),
            FromClause::Multi(tables) if tables.len() == 1 => Some(tables[0].alias.as_str()),
            FromClause::Multi(_) => None,
        }
    }

    /// Declared metadata of the primary table, if any.
    pub fn primary_meta(&self) -> Option<&Arc<TableMeta>> {
        match &self.from {
            FromClause::Single { table, .. } => table.meta.as_ref(),
            FromClause::Multi(tables) => tables.iter().find_map(|t| match &t.source {
                TableSource::Table(table) => table.meta.as_ref(),
                TableSource::Query(_) => None,
            }),
        }
    }

    /// Name of the primary table, if the query reads one.
    pub fn primary_table_name(&self) -> Option<&str> {
        match &self.from {
            FromClause::Single { table, .. } => Some(table.name.as_str()),
            FromClause::Multi(tables) => tables.iter().find_map(|t| match &t.source {
                TableSource::Table(table) => Some(table.name.as_str()),
                TableSource::Query(_) => None,
            }),
        }
    }
}

/// A zero-based page request; `size == 0` disables pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Page {
    pub offset: u64,
    pub size: u64,
}

impl Page {
    pub const fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Whether this page actually restricts the result.
    pub const fn is_active(&self) -> bool {
        self.size > 0
    }

    /// Last row number included, counting from one.
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }
}
