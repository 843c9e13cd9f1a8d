//! SQL clause types and the shared clause renderers.
//!
//! Every dialect renders clauses in the same order (select list, FROM,
//! joins, WHERE, GROUP BY, HAVING, ORDER BY). The functions here are the
//! default renderers the `Dialect` trait delegates to; a dialect overrides
//! only the clauses it spells differently.

use crate::column::{CaseColumn, Column, ColumnOperator, Projection};
use crate::condition::{Condition, render_conditions};
use crate::context::RenderContext;
use crate::join::{Join, JoinKind, JoinTarget};
use crate::query::{FromClause, Query, TableSource};
use serde::{Deserialize, Serialize};
use sqlbridge_core::{ConstructionErrorKind, Error, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: Column,
    pub direction: Direction,
}

impl Order {
    pub fn new(column: impl Into<Column>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<Column>) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: impl Into<Column>) -> Self {
        Self::new(column, Direction::Desc)
    }
}

/// Rendered pieces of one SELECT, before pagination.
///
/// Condition fields hold the predicate text without its keyword; empty
/// strings mean the clause is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectParts {
    pub distinct: bool,
    pub select_list: String,
    pub from: String,
    /// Join clauses, each with a leading space
    pub joins: String,
    pub where_cond: String,
    pub group_list: String,
    pub having_cond: String,
    pub order_list: String,
}

impl SelectParts {
    /// Assemble the statement in clause order.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.select_list);
        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        sql.push_str(&self.joins);
        if !self.where_cond.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_cond);
        }
        if !self.group_list.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_list);
        }
        if !self.having_cond.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.having_cond);
        }
        if !self.order_list.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_list);
        }
        sql
    }

    /// Whether grouping, ordering or de-duplication shape the row order.
    pub fn is_shaped(&self) -> bool {
        self.distinct
            || !self.group_list.is_empty()
            || !self.having_cond.is_empty()
            || !self.order_list.is_empty()
    }
}

/// Select list: explicit projections, else `alias.*` or `*`.
pub fn render_select_list(ctx: &mut RenderContext<'_>, query: &Query) -> Result<String> {
    if query.columns.is_empty() {
        return Ok(match query.implicit_alias() {
            Some(alias) => format!("{}.*", alias),
            None => "*".to_string(),
        });
    }
    let mut items = Vec::with_capacity(query.columns.len());
    for projection in &query.columns {
        items.push(render_projection(ctx, projection)?);
    }
    Ok(items.join(", "))
}

fn render_projection(ctx: &mut RenderContext<'_>, projection: &Projection) -> Result<String> {
    match projection {
        Projection::Column(column) => {
            let sql = ctx.column(column)?;
            Ok(match &column.as_name {
                Some(as_name) => format!("{} AS {}", sql, ctx.ident(as_name)),
                None => sql,
            })
        }
        Projection::Case(case) => render_case(ctx, case),
        Projection::Query { query, as_name } => {
            let sub = ctx.subquery(query)?;
            Ok(format!("({}) AS {}", sub, ctx.ident(as_name)))
        }
    }
}

fn render_case(ctx: &mut RenderContext<'_>, case: &CaseColumn) -> Result<String> {
    if case.branches.is_empty() {
        return Err(Error::construction(
            ConstructionErrorKind::InvalidQuery,
            "CASE column has no branches",
        ));
    }
    let mut sql = String::from("CASE");
    for (condition, value) in &case.branches {
        let when = render_conditions(ctx, condition)?;
        if when.is_empty() {
            return Err(Error::construction(
                ConstructionErrorKind::InvalidQuery,
                "CASE branch condition renders no predicate",
            ));
        }
        let then = ctx.bind_value(None, value.clone());
        sql.push_str(&format!(" WHEN{} THEN {}", when, then));
    }
    if let Some(value) = &case.else_value {
        let otherwise = ctx.bind_value(None, value.clone());
        sql.push_str(&format!(" ELSE {}", otherwise));
    }
    sql.push_str(" END");
    if let Some(as_name) = &case.as_name {
        sql.push_str(&format!(" AS {}", ctx.ident(as_name)));
    }
    Ok(sql)
}

/// FROM list without the keyword.
pub fn render_from(ctx: &mut RenderContext<'_>, from: &FromClause) -> Result<String> {
    match from {
        FromClause::Single { table, alias } => Ok(match alias {
            Some(alias) => format!("{} {}", ctx.table_name(table), alias),
            None => ctx.table_name(table),
        }),
        FromClause::Multi(tables) => {
            if tables.is_empty() {
                return Err(Error::construction(
                    ConstructionErrorKind::InvalidQuery,
                    "multi-table query has no tables",
                ));
            }
            let mut items = Vec::with_capacity(tables.len());
            for entry in tables {
                let source = match &entry.source {
                    TableSource::Table(table) => ctx.table_name(table),
                    TableSource::Query(query) => format!("({})", ctx.subquery(query)?),
                };
                items.push(format!("{} {}", source, entry.alias));
            }
            Ok(items.join(", "))
        }
    }
}

/// One join clause with a leading space.
pub fn render_join(ctx: &mut RenderContext<'_>, join: &Join) -> Result<String> {
    if join.kind == JoinKind::Full && !ctx.dialect().supports_full_join() {
        return Err(Error::construction(
            ConstructionErrorKind::InvalidQuery,
            format!("{} does not support FULL JOIN", ctx.dialect().name()),
        ));
    }
    let target = match &join.target {
        JoinTarget::Table(table) => ctx.table_name(table),
        JoinTarget::Query(query) => format!("({})", ctx.subquery(query)?),
        JoinTarget::Raw(sql) => sql.clone(),
    };
    let on = render_conditions(ctx, &join.on)?;
    if on.is_empty() {
        return Err(Error::construction(
            ConstructionErrorKind::InvalidQuery,
            format!("join on '{}' has no ON predicate", target),
        ));
    }
    Ok(match &join.alias {
        Some(alias) => format!(" {} {} {} ON{}", join.kind.as_str(), target, alias, on),
        None => format!(" {} {} ON{}", join.kind.as_str(), target, on),
    })
}

/// Predicate text of a WHERE or HAVING condition, without the keyword.
pub fn render_predicate(ctx: &mut RenderContext<'_>, condition: &Condition) -> Result<String> {
    Ok(render_conditions(ctx, condition)?.trim_start().to_string())
}

/// GROUP BY list without the keyword.
pub fn render_group(ctx: &mut RenderContext<'_>, columns: &[Column]) -> Result<String> {
    let items = columns
        .iter()
        .map(|c| ctx.column(c))
        .collect::<Result<Vec<_>>>()?;
    Ok(items.join(", "))
}

/// ORDER BY list without the keyword.
pub fn render_order(ctx: &mut RenderContext<'_>, orders: &[Order]) -> Result<String> {
    let items = orders
        .iter()
        .map(|o| Ok(format!("{} {}", ctx.column(&o.column)?, o.direction.as_str())))
        .collect::<Result<Vec<_>>>()?;
    Ok(items.join(", "))
}

/// Render a column transform with native SQL operators.
pub fn native_operator(op: ColumnOperator, column: &str, operand: Option<i64>) -> Result<String> {
    if op.is_unary() {
        return Ok(format!("({}{})", op.symbol(), column));
    }
    let n = require_operand(op, operand)?;
    Ok(format!("({} {} {})", column, op.symbol(), n))
}

/// The operand of a binary transform, or an error naming the operator.
pub fn require_operand(op: ColumnOperator, operand: Option<i64>) -> Result<i64> {
    operand.ok_or_else(|| {
        Error::construction(
            ConstructionErrorKind::InvalidQuery,
            format!("operator '{}' needs an operand", op.symbol()),
        )
    })
}
