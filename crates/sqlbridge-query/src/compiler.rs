//! SELECT and COUNT compilation.

use crate::alias::resolve_aliases;
use crate::clause::SelectParts;
use crate::context::{BindParam, RenderContext};
use crate::dialect::Dialect;
use crate::query::{FromClause, Page, Query};
use serde::{Deserialize, Serialize};
use sqlbridge_core::{CompileOptions, Result, TextCase, Value};

/// Alias given to an unaliased table when a dialect needs one for paging.
pub const PAGING_ALIAS: &str = "t_";

/// What the rows of a compiled query represent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultShape {
    /// Whole rows of one table
    Table(String),
    /// Arbitrary projected rows
    Rows,
    /// A single count
    Count,
}

/// SQL text plus everything needed to execute it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    /// Parameters in placeholder order
    pub params: Vec<BindParam>,
    pub shape: ResultShape,
    /// Output name of every projection
    pub output_columns: Vec<String>,
}

impl CompiledQuery {
    /// Raw parameter values in placeholder order.
    pub fn values(&self) -> Vec<Value> {
        self.params.iter().map(|p| p.value.clone()).collect()
    }
}

/// Which select list [`build_parts`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// The query's projections, DISTINCT and ORDER BY
    Normal,
    /// `COUNT(*)` with no DISTINCT and no ORDER BY
    CountStar,
}

/// Render every clause of `query` through the context's dialect.
///
/// Parameters are pushed in textual order.
pub fn build_parts(
    ctx: &mut RenderContext<'_>,
    query: &Query,
    mode: ProjectionMode,
) -> Result<SelectParts> {
    let d = ctx.dialect();
    let select_list = match mode {
        ProjectionMode::Normal => d.select_list(ctx, query)?,
        ProjectionMode::CountStar => "COUNT(*)".to_string(),
    };
    let from = d.from_clause(ctx, &query.from)?;
    let mut joins = String::new();
    for join in &query.joins {
        joins.push_str(&d.join_clause(ctx, join)?);
    }
    let where_cond = d.where_clause(ctx, &query.condition)?;
    let group_list = d.group_clause(ctx, &query.group_by)?;
    let having_cond = d.having_clause(ctx, &query.having)?;
    let order_list = match mode {
        ProjectionMode::Normal => d.order_clause(ctx, &query.orders)?,
        ProjectionMode::CountStar => String::new(),
    };
    tracing::trace!(
        dialect = d.name(),
        select = %select_list,
        from = %from,
        "Rendered clauses"
    );
    Ok(SelectParts {
        distinct: query.distinct && mode == ProjectionMode::Normal,
        select_list,
        from,
        joins,
        where_cond,
        group_list,
        having_cond,
        order_list,
    })
}

/// Render a query with no pagination, as used for nested queries.
pub(crate) fn render_plain(ctx: &mut RenderContext<'_>, query: &Query) -> Result<String> {
    Ok(build_parts(ctx, query, ProjectionMode::Normal)?.to_sql())
}

/// Compile a SELECT, paginated when `page` has a non-zero size.
pub fn compile_select(
    dialect: &dyn Dialect,
    query: &Query,
    page: Option<Page>,
    options: &CompileOptions,
) -> Result<CompiledQuery> {
    let page = page.filter(Page::is_active);
    let forced = (page.is_some() && dialect.requires_paging_alias()).then_some(PAGING_ALIAS);
    let query = resolve_aliases(query, forced);
    let table = query.primary_table_name().map(str::to_string);
    let with_table = |e: sqlbridge_core::Error| match &table {
        Some(t) => e.with_table(t),
        None => e,
    };

    let mut ctx = RenderContext::for_query(dialect, &query);
    let parts = build_parts(&mut ctx, &query, ProjectionMode::Normal).map_err(with_table)?;
    let sql = match page {
        Some(page) => dialect.paginate(&mut ctx, parts, page).map_err(with_table)?,
        None => parts.to_sql(),
    };
    let sql = fold_case(&sql, options.text_case);
    let params = ctx.into_params();

    tracing::debug!(
        dialect = dialect.name(),
        table = ?table,
        paged = page.is_some(),
        params = params.len(),
        "Compiled SELECT"
    );

    Ok(CompiledQuery {
        sql,
        params,
        shape: select_shape(&query),
        output_columns: output_columns(&query),
    })
}

/// Compile a COUNT of the rows `query` would return.
///
/// DISTINCT, grouped and HAVING-filtered queries are counted through a
/// derived table. The result never carries ORDER BY or pagination.
pub fn compile_count(
    dialect: &dyn Dialect,
    query: &Query,
    options: &CompileOptions,
) -> Result<CompiledQuery> {
    let query = resolve_aliases(query, None);
    let table = query.primary_table_name().map(str::to_string);
    let mut ctx = RenderContext::for_query(dialect, &query);

    let rendered = if query.distinct || !query.group_by.is_empty() || !query.having.is_empty() {
        build_parts(&mut ctx, &query, ProjectionMode::Normal).map(|mut inner| {
            inner.order_list.clear();
            format!("SELECT COUNT(*) FROM ({}) cnt_", inner.to_sql())
        })
    } else {
        build_parts(&mut ctx, &query, ProjectionMode::CountStar).map(|parts| parts.to_sql())
    };
    let sql = match (rendered, &table) {
        (Ok(sql), _) => sql,
        (Err(e), Some(t)) => return Err(e.with_table(t)),
        (Err(e), None) => return Err(e),
    };
    let sql = fold_case(&sql, options.text_case);
    let params = ctx.into_params();

    tracing::debug!(
        dialect = dialect.name(),
        table = ?table,
        params = params.len(),
        "Compiled COUNT"
    );

    Ok(CompiledQuery {
        sql,
        params,
        shape: ResultShape::Count,
        output_columns: vec!["COUNT(*)".to_string()],
    })
}

fn select_shape(query: &Query) -> ResultShape {
    match &query.from {
        FromClause::Single { table, .. } if query.columns.is_empty() && query.joins.is_empty() => {
            ResultShape::Table(table.name.clone())
        }
        _ => ResultShape::Rows,
    }
}

fn output_columns(query: &Query) -> Vec<String> {
    if !query.columns.is_empty() {
        return query.columns.iter().map(|p| p.output_name()).collect();
    }
    match (&query.from, query.primary_meta()) {
        (FromClause::Single { .. }, Some(meta)) if query.joins.is_empty() => {
            meta.active_columns().map(|c| c.name.clone()).collect()
        }
        _ => vec!["*".to_string()],
    }
}

/// Fold the case of SQL text outside quoted identifiers and literals.
///
/// # Examples
///
/// ```
/// use sqlbridge_query::fold_case;
/// use sqlbridge_core::TextCase;
///
/// assert_eq!(
///     fold_case("select \"Id\" from t where n = 'Bob' and x = ?", TextCase::Upper),
///     "SELECT \"Id\" FROM T WHERE N = 'Bob' AND X = ?"
/// );
/// ```
pub fn fold_case(sql: &str, case: TextCase) -> String {
    if case == TextCase::AsIs {
        return sql.to_string();
    }
    let mut out = String::with_capacity(sql.len());
    let mut closing: Option<char> = None;
    for ch in sql.chars() {
        match closing {
            Some(end) => {
                if ch == end {
                    closing = None;
                }
                out.push(ch);
            }
            None => {
                closing = match ch {
                    '\'' => Some('\''),
                    '"' => Some('"'),
                    '`' => Some('`'),
                    '[' => Some(']'),
                    _ => None,
                };
                match case {
                    TextCase::Upper => out.extend(ch.to_uppercase()),
                    TextCase::Lower => out.extend(ch.to_lowercase()),
                    TextCase::AsIs => out.push(ch),
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::condition::Condition;
    use crate::dialect::{
        Db2Dialect, H2Dialect, MysqlDialect, OracleDialect, PostgresDialect, SqlServerDialect,
    };
    use crate::expr::Expression;
    use crate::join::Join;
    use crate::query::AliasedTable;
    use sqlbridge_core::{ColumnMeta, TableMeta};
    use std::sync::Arc;

    fn opts() -> CompileOptions {
        CompileOptions::default()
    }

    #[test]
    fn test_plain_select() {
        let q = Query::table("users")
            .column("id")
            .column(Column::new("email").as_name("mail"))
            .and(Expression::eq("status", "active"))
            .desc("id");
        let c = compile_select(&MysqlDialect, &q, None, &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT id, email AS mail FROM users WHERE status = ? ORDER BY id DESC"
        );
        assert_eq!(c.values(), vec![Value::from("active")]);
        assert_eq!(c.output_columns, vec!["id", "mail"]);
        assert_eq!(c.shape, ResultShape::Rows);
    }

    #[test]
    fn test_mysql_pagination_params_last() {
        let q = Query::table("users").and(Expression::gt("age", 18));
        let c = compile_select(&MysqlDialect, &q, Some(Page::new(10, 20)), &opts()).unwrap();
        assert!(c.sql.ends_with("LIMIT ? OFFSET ?"));
        assert_eq!(
            c.values(),
            vec![Value::Int(18), Value::BigInt(20), Value::BigInt(10)]
        );
        assert_eq!(c.shape, ResultShape::Table("users".into()));
    }

    #[test]
    fn test_zero_size_page_is_unpaged() {
        let q = Query::table("users");
        let c = compile_select(&OracleDialect, &q, Some(Page::new(5, 0)), &opts()).unwrap();
        assert_eq!(c.sql, "SELECT * FROM users");
        assert!(c.params.is_empty());
    }

    #[test]
    fn test_postgres_and_h2_use_limit_offset() {
        let q = Query::table("users");
        for dialect in [&PostgresDialect as &dyn Dialect, &H2Dialect] {
            let c = compile_select(dialect, &q, Some(Page::new(0, 10)), &opts()).unwrap();
            assert_eq!(c.sql, "SELECT * FROM users LIMIT ? OFFSET ?");
            assert_eq!(c.values(), vec![Value::BigInt(10), Value::BigInt(0)]);
        }
    }

    #[test]
    fn test_oracle_rownum_injection() {
        let q = Query::table("users").column("id").column("name");
        let c = compile_select(&OracleDialect, &q, Some(Page::new(0, 5)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT a.* FROM (SELECT t_.id, t_.name, ROWNUM rn_ FROM users t_ \
             WHERE ROWNUM <= ?) a WHERE a.rn_ > ?"
        );
        assert_eq!(c.values(), vec![Value::BigInt(5), Value::BigInt(0)]);
    }

    #[test]
    fn test_oracle_alias_reaches_where() {
        let q = Query::table("users").and(Expression::eq("status", 1));
        let c = compile_select(&OracleDialect, &q, Some(Page::new(0, 5)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT a.* FROM (SELECT t_.*, ROWNUM rn_ FROM users t_ \
             WHERE (t_.status = ?) AND ROWNUM <= ?) a WHERE a.rn_ > ?"
        );
        assert_eq!(
            c.values(),
            vec![Value::Int(1), Value::BigInt(5), Value::BigInt(0)]
        );
    }

    #[test]
    fn test_oracle_double_wrap_when_ordered() {
        let q = Query::table("users").alias("u").asc("name");
        let c = compile_select(&OracleDialect, &q, Some(Page::new(20, 10)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT a.* FROM (SELECT b.*, ROWNUM rn_ FROM (SELECT u.* FROM users u \
             ORDER BY u.name ASC) b WHERE ROWNUM <= ?) a WHERE a.rn_ > ?"
        );
        assert_eq!(c.values(), vec![Value::BigInt(30), Value::BigInt(20)]);
    }

    #[test]
    fn test_sqlserver_row_number() {
        let q = Query::table("users").column("id");
        let c = compile_select(&SqlServerDialect, &q, Some(Page::new(40, 20)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT TOP 20 * FROM (SELECT id, ROW_NUMBER() OVER(ORDER BY (SELECT 0)) rn_ \
             FROM users) ms_ WHERE ms_.rn_ > 40"
        );
        assert!(c.params.is_empty());
    }

    #[test]
    fn test_db2_offset_fetch() {
        let q = Query::table("users").asc("id");
        let c = compile_select(&Db2Dialect, &q, Some(Page::new(10, 20)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT * FROM users ORDER BY id ASC OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
        );
        assert_eq!(c.values(), vec![Value::BigInt(10), Value::BigInt(20)]);
    }

    #[test]
    fn test_count_plain() {
        let q = Query::table("users")
            .column("id")
            .and(Expression::eq("status", 1))
            .desc("id");
        for dialect in crate::dialect::all() {
            let c = dialect.compile_count(&q, &opts()).unwrap();
            assert!(!c.sql.contains("ORDER BY"), "{}", c.sql);
            assert!(!c.sql.contains("rn_"), "{}", c.sql);
            assert_eq!(c.shape, ResultShape::Count);
        }
        let c = compile_count(&MysqlDialect, &q, &opts()).unwrap();
        assert_eq!(c.sql, "SELECT COUNT(*) FROM users WHERE status = ?");
        assert_eq!(c.values(), vec![Value::Int(1)]);
    }

    #[test]
    fn test_count_distinct_and_grouped_wrap() {
        let q = Query::table("orders").distinct().column("user_id").asc("user_id");
        let c = compile_count(&PostgresDialect, &q, &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT COUNT(*) FROM (SELECT DISTINCT user_id FROM orders) cnt_"
        );

        let q = Query::table("orders")
            .column("user_id")
            .group_by("user_id")
            .having(Expression::gt(Column::new("id").function("COUNT"), 2).into());
        let c = compile_count(&OracleDialect, &q, &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT COUNT(*) FROM (SELECT user_id FROM orders GROUP BY user_id \
             HAVING COUNT(id) > ?) cnt_"
        );
        assert_eq!(c.values(), vec![Value::Int(2)]);
    }

    #[test]
    fn test_count_having_without_group_wraps() {
        let q = Query::table("orders")
            .column(Column::new("id").function("COUNT"))
            .having(Expression::gt(Column::new("id").function("COUNT"), 2).into());
        let c = compile_count(&MysqlDialect, &q, &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT COUNT(*) FROM (SELECT COUNT(id) FROM orders HAVING COUNT(id) > ?) cnt_"
        );
        assert_eq!(c.values(), vec![Value::Int(2)]);
    }

    #[test]
    fn test_oracle_forced_alias_replaces_table_qualifier() {
        let q = Query::table("users")
            .column(Column::of("users", "id"))
            .and(Expression::eq(Column::of("users", "status"), 1));
        let c = compile_select(&OracleDialect, &q, Some(Page::new(0, 5)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT a.* FROM (SELECT t_.id, ROWNUM rn_ FROM users t_ \
             WHERE (t_.status = ?) AND ROWNUM <= ?) a WHERE a.rn_ > ?"
        );
        assert_eq!(
            c.values(),
            vec![Value::Int(1), Value::BigInt(5), Value::BigInt(0)]
        );
    }

    #[test]
    fn test_sqlserver_distinct_paging_numbers_unique_rows() {
        let q = Query::table("users").distinct().column("city").asc("city");
        let c = compile_select(&SqlServerDialect, &q, Some(Page::new(0, 5)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT TOP 5 * FROM (SELECT x_.*, ROW_NUMBER() OVER(ORDER BY x_.city ASC) rn_ \
             FROM (SELECT DISTINCT city FROM users) x_) ms_ WHERE ms_.rn_ > 0"
        );
    }

    #[test]
    fn test_param_order_follows_text() {
        let sub = Query::table("orders")
            .column(Column::new("id").function("COUNT"))
            .and(Expression::gt("total", 100));
        let on = Expression::columns(
            Column::of("p", "user_id"),
            crate::expr::Operator::Eq,
            Column::of("u", "id"),
        )
        .into();
        let q = Query::multi(vec![AliasedTable::table("users", "u")])
            .subquery_column(sub, "big_orders")
            .join(Join::inner("profiles", on).alias("p"))
            .and(Expression::eq(Column::of("u", "status"), 1))
            .group_by("id")
            .having(Expression::gt(Column::new("id").function("COUNT"), 3).into());
        let c = compile_select(&MysqlDialect, &q, Some(Page::new(0, 10)), &opts()).unwrap();
        assert_eq!(
            c.sql,
            "SELECT (SELECT COUNT(id) FROM orders WHERE total > ?) AS big_orders FROM users u \
             INNER JOIN profiles p ON p.user_id = u.id WHERE u.status = ? GROUP BY u.id \
             HAVING COUNT(id) > ? LIMIT ? OFFSET ?"
        );
        assert_eq!(
            c.values(),
            vec![
                Value::Int(100),
                Value::Int(1),
                Value::Int(3),
                Value::BigInt(10),
                Value::BigInt(0)
            ]
        );
    }

    #[test]
    fn test_text_case_folding() {
        let q = Query::table("Users").filter(
            Condition::new()
                .and(Expression::eq("Name", "Bob"))
                .and_sql("LABEL = 'MiXed'", Vec::new()),
        );
        let options = CompileOptions::default().text_case(TextCase::Lower);
        let c = compile_select(&MysqlDialect, &q, Some(Page::new(0, 1)), &options).unwrap();
        assert_eq!(
            c.sql,
            "select * from users where name = ? and label = 'MiXed' limit ? offset ?"
        );
    }

    #[test]
    fn test_fold_case_skips_quotes() {
        assert_eq!(
            fold_case("SELECT `Id`, [Name] FROM \"T\"", TextCase::Lower),
            "select `Id`, [Name] from \"T\""
        );
        assert_eq!(fold_case("a = ?", TextCase::AsIs), "a = ?");
    }

    #[test]
    fn test_output_columns_from_metadata() {
        let meta = Arc::new(
            TableMeta::builder("users")
                .column(ColumnMeta::integer("id").primary_key())
                .column(ColumnMeta::varchar("email", 255))
                .column(ColumnMeta::varchar("legacy", 10).dropped())
                .build()
                .unwrap(),
        );
        let c = compile_select(&MysqlDialect, &Query::table(meta), None, &opts()).unwrap();
        assert_eq!(c.output_columns, vec!["id", "email"]);
        assert_eq!(c.shape, ResultShape::Table("users".into()));
    }

    #[test]
    fn test_errors_carry_table() {
        let q = Query::table("users").column(Column::default());
        let err = compile_select(&MysqlDialect, &q, None, &opts()).unwrap_err();
        assert!(err.is_construction());
        assert_eq!(err.table(), Some("users"));
    }
}
