//! Pagination strategies.
//!
//! Each function takes the rendered parts of a SELECT whose clause
//! parameters are already in the context, appends any paging parameters,
//! and returns the final statement.

use crate::clause::SelectParts;
use crate::context::{BindParam, RenderContext};
use crate::query::Page;
use sqlbridge_core::{ColumnSubtype, SemanticType, Value};

fn push_count(ctx: &mut RenderContext<'_>, n: u64) {
    let value = Value::BigInt(i64::try_from(n).unwrap_or(i64::MAX));
    ctx.push_param(BindParam::typed(
        value,
        SemanticType::Long,
        ColumnSubtype::Default,
    ));
}

/// `... LIMIT ? OFFSET ?` binding size then offset.
pub fn limit_offset(ctx: &mut RenderContext<'_>, parts: &SelectParts, page: Page) -> String {
    push_count(ctx, page.size);
    push_count(ctx, page.offset);
    format!("{} LIMIT ? OFFSET ?", parts.to_sql())
}

/// `... OFFSET ? ROWS FETCH NEXT ? ROWS ONLY` binding offset then size.
pub fn offset_fetch(ctx: &mut RenderContext<'_>, parts: &SelectParts, page: Page) -> String {
    push_count(ctx, page.offset);
    push_count(ctx, page.size);
    format!("{} OFFSET ? ROWS FETCH NEXT ? ROWS ONLY", parts.to_sql())
}

/// Window-function paging with literal bounds.
///
/// The inner ORDER BY moves into the `ROW_NUMBER()` window, since ORDER BY
/// is not allowed in a derived table. A DISTINCT query is numbered through
/// a derived table `x_`, because the window runs before duplicates are
/// removed. Grouped queries are numbered in place: the window already sees
/// one row per group.
pub fn row_number(mut parts: SelectParts, page: Page) -> String {
    let order = std::mem::take(&mut parts.order_list);
    let numbered = if parts.distinct {
        let window = if order.is_empty() {
            "(SELECT 0)".to_string()
        } else {
            outer_order(&order)
        };
        format!(
            "SELECT x_.*, ROW_NUMBER() OVER(ORDER BY {}) rn_ FROM ({}) x_",
            window,
            parts.to_sql()
        )
    } else {
        let window = if order.is_empty() {
            "(SELECT 0)".to_string()
        } else {
            order
        };
        parts.select_list = format!(
            "{}, ROW_NUMBER() OVER(ORDER BY {}) rn_",
            parts.select_list, window
        );
        parts.to_sql()
    };
    format!(
        "SELECT TOP {} * FROM ({}) ms_ WHERE ms_.rn_ > {}",
        page.size, numbered, page.offset
    )
}

/// Re-point a rendered ORDER BY list at the derived table `x_`.
///
/// DISTINCT requires every ORDER BY item in the select list, so a plain
/// column keeps its output name once its qualifier is dropped. Anything
/// else is passed through unchanged.
fn outer_order(order: &str) -> String {
    let plain = |s: &str| !s.is_empty() && !s.contains(['(', ')', ' ', '.']);
    order
        .split(", ")
        .map(|item| {
            let (expr, direction) = match item.rsplit_once(' ') {
                Some((expr, dir)) if dir == "ASC" || dir == "DESC" => (expr, Some(dir)),
                _ => (item, None),
            };
            let name = match expr.rsplit_once('.') {
                Some((qualifier, name)) if plain(qualifier) && plain(name) => name,
                _ => expr,
            };
            let expr = if plain(name) {
                format!("x_.{name}")
            } else {
                expr.to_string()
            };
            match direction {
                Some(dir) => format!("{expr} {dir}"),
                None => expr,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pseudo-column paging with `ROWNUM`.
///
/// An unshaped query with a qualified select list takes `ROWNUM rn_`
/// directly; anything grouped, ordered or distinct is wrapped twice so
/// `ROWNUM` numbers the final row order.
pub fn rownum(ctx: &mut RenderContext<'_>, mut parts: SelectParts, page: Page) -> String {
    let sql = if !parts.is_shaped() && parts.select_list != "*" {
        parts.select_list = format!("{}, ROWNUM rn_", parts.select_list);
        parts.where_cond = if parts.where_cond.is_empty() {
            "ROWNUM <= ?".to_string()
        } else {
            format!("({}) AND ROWNUM <= ?", parts.where_cond)
        };
        format!("SELECT a.* FROM ({}) a WHERE a.rn_ > ?", parts.to_sql())
    } else {
        format!(
            "SELECT a.* FROM (SELECT b.*, ROWNUM rn_ FROM ({}) b WHERE ROWNUM <= ?) a WHERE a.rn_ > ?",
            parts.to_sql()
        )
    };
    push_count(ctx, page.end());
    push_count(ctx, page.offset);
    sql
}
