//! Alias back-fill.
//!
//! Run once on a query before its clauses are rendered. The input is never
//! mutated; a normalized copy is returned.

use crate::column::{Column, Projection};
use crate::condition::Condition;
use crate::expr::{Expression, Operand};
use crate::query::{FromClause, Query};
use sqlbridge_core::{CaseSensitivity, identifiers_match};

/// Give unqualified columns the query's single implicit alias.
///
/// Without `forced_alias`, projections, GROUP BY and ORDER BY columns with
/// no alias inherit [`Query::implicit_alias`]; conditions are left alone.
///
/// With `forced_alias`, an unaliased single table is given that alias and
/// every unqualified column reference in the query scope inherits it,
/// conditions included. Columns qualified with the table's own name are
/// requalified with the alias, in JOIN ON conditions as well, since the
/// bare name is no longer in scope. Nested queries keep their own scope.
pub fn resolve_aliases(query: &Query, forced_alias: Option<&str>) -> Query {
    let mut resolved = query.clone();
    let mut renamed: Option<(String, CaseSensitivity)> = None;
    if let (Some(forced), FromClause::Single { table, alias }) = (forced_alias, &mut resolved.from)
    {
        if alias.is_none() {
            *alias = Some(forced.to_string());
            renamed = Some((table.name.clone(), table.sensitivity));
        }
    }
    let force = renamed.is_some();
    let Some(alias) = resolved.implicit_alias().map(str::to_string) else {
        return resolved;
    };

    let requalify = |column: &Column| -> Column {
        match (&column.alias, &renamed) {
            (Some(qualifier), Some((table, mode))) if identifiers_match(table, qualifier, *mode) => {
                column.clone().alias(alias.as_str())
            }
            _ => column.clone(),
        }
    };
    let fill = |column: &Column| -> Column {
        if column.alias.is_none() && column.name.is_some() {
            column.clone().alias(alias.as_str())
        } else {
            requalify(column)
        }
    };

    resolved.columns = resolved
        .columns
        .iter()
        .map(|p| match p {
            Projection::Column(c) => Projection::Column(fill(c)),
            Projection::Case(case) if force => {
                let mut case = case.clone();
                case.branches = case
                    .branches
                    .iter()
                    .map(|(cond, value)| (fill_condition(cond, &fill), value.clone()))
                    .collect();
                Projection::Case(case)
            }
            other => other.clone(),
        })
        .collect();
    resolved.group_by = resolved.group_by.iter().map(fill).collect();
    for order in &mut resolved.orders {
        order.column = fill(&order.column);
    }
    if force {
        resolved.condition = fill_condition(&resolved.condition, &fill);
        resolved.having = fill_condition(&resolved.having, &fill);
        for join in &mut resolved.joins {
            join.on = fill_condition(&join.on, &requalify);
        }
    }
    resolved
}

fn fill_condition(condition: &Condition, fill: &impl Fn(&Column) -> Column) -> Condition {
    condition.map_expressions(&mut |expr: &Expression| {
        let mut expr = expr.clone();
        expr.left = expr.left.as_ref().map(fill);
        if let Operand::Column(c) = &expr.value {
            expr.value = Operand::Column(fill(c));
        }
        if let Operand::Column(c) = &expr.and_value {
            expr.and_value = Operand::Column(fill(c));
        }
        expr
    })
}
