//! Per-compilation rendering state.

use crate::column::Column;
use crate::dialect::Dialect;
use crate::join::JoinTarget;
use crate::query::{FromClause, Query, TableRef, TableSource};
use sqlbridge_core::{CaseSensitivity, ColumnSubtype, Result, SemanticType, TableMeta, Value};
use std::sync::Arc;

/// A bound parameter with the metadata the marshaller needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BindParam {
    pub value: Value,
    /// Declared or inferred semantic type; `None` for NULL with no column
    pub semantic_type: Option<SemanticType>,
    pub subtype: ColumnSubtype,
    /// Declared scale of the target column
    pub scale: Option<u32>,
    /// Declared column the value is compared with
    pub column: Option<String>,
}

impl BindParam {
    /// A parameter typed from its value alone.
    pub fn inferred(value: Value) -> Self {
        Self {
            semantic_type: SemanticType::infer(&value),
            value,
            subtype: ColumnSubtype::Default,
            scale: None,
            column: None,
        }
    }

    /// A parameter with an explicit semantic type.
    pub fn typed(value: Value, semantic_type: SemanticType, subtype: ColumnSubtype) -> Self {
        Self {
            value,
            semantic_type: Some(semantic_type),
            subtype,
            scale: None,
            column: None,
        }
    }
}

/// Rendering state for one query scope.
///
/// Holds the dialect, the casing mode, the declared tables in scope (for
/// typing bound values) and the parameters pushed so far.
#[derive(Debug)]
pub struct RenderContext<'a> {
    dialect: &'a dyn Dialect,
    sensitivity: CaseSensitivity,
    tables: Vec<(Option<String>, Arc<TableMeta>)>,
    params: Vec<BindParam>,
}

impl<'a> RenderContext<'a> {
    /// Empty context with default casing and no declared tables.
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            sensitivity: CaseSensitivity::Default,
            tables: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Context for rendering `query`, with its declared tables in scope.
    pub fn for_query(dialect: &'a dyn Dialect, query: &Query) -> Self {
        let mut ctx = Self::new(dialect);
        let mut declare = |table: &TableRef, alias: Option<&str>| {
            if let Some(meta) = &table.meta {
                ctx.tables.push((alias.map(str::to_string), Arc::clone(meta)));
            }
        };
        match &query.from {
            FromClause::Single { table, alias } => declare(table, alias.as_deref()),
            FromClause::Multi(tables) => {
                for entry in tables {
                    if let TableSource::Table(table) = &entry.source {
                        declare(table, Some(entry.alias.as_str()));
                    }
                }
            }
        }
        for join in &query.joins {
            if let JoinTarget::Table(table) = &join.target {
                declare(table, join.alias.as_deref());
            }
        }
        if let Some(meta) = query.primary_meta() {
            ctx.sensitivity = meta.sensitivity;
        }
        ctx
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn sensitivity(&self) -> CaseSensitivity {
        self.sensitivity
    }

    /// Render an identifier under the scope's casing mode.
    pub fn ident(&self, name: &str) -> String {
        self.dialect.render_cased_identifier(name, self.sensitivity)
    }

    /// Render a table name under its own casing mode.
    pub fn table_name(&self, table: &TableRef) -> String {
        self.dialect
            .render_cased_identifier(&table.name, table.sensitivity)
    }

    /// Render a column reference: qualification, transform, then function.
    pub fn column(&self, column: &Column) -> Result<String> {
        column.validate()?;
        let mut sql = match (&column.alias, &column.name) {
            (Some(alias), Some(name)) => format!("{}.{}", alias, self.ident(name)),
            (Some(alias), None) => format!("{}.*", alias),
            (None, Some(name)) => self.ident(name),
            (None, None) => "*".to_string(),
        };
        if let Some(op) = column.operator {
            sql = self
                .dialect
                .render_operator_expression(op, &sql, column.operand)?;
        }
        if let Some(function) = &column.function {
            sql = render_function(function, &sql);
        }
        Ok(sql)
    }

    /// Push a value compared against `column` and return its placeholder.
    ///
    /// A column `format` template wraps the placeholder.
    pub fn bind_value(&mut self, column: Option<&Column>, value: Value) -> String {
        let mut param = BindParam::inferred(value);
        if let Some(col) = column.filter(|c| c.is_plain()) {
            if let Some(meta) = self.lookup(col) {
                param.semantic_type = Some(meta.semantic_type);
                param.subtype = meta.subtype;
                param.scale = meta.scale;
                param.column = Some(meta.name.clone());
            }
        }
        self.params.push(param);
        match column.and_then(|c| c.format.as_deref()) {
            Some(template) => template.replace("{}", "?"),
            None => "?".to_string(),
        }
    }

    /// Push a value with no column behind it.
    pub fn push_raw(&mut self, value: Value) {
        self.params.push(BindParam::inferred(value));
    }

    /// Push an already-typed parameter.
    pub fn push_param(&mut self, param: BindParam) {
        self.params.push(param);
    }

    /// Render a nested query in its own scope and splice its parameters here.
    pub fn subquery(&mut self, query: &Query) -> Result<String> {
        let query = crate::alias::resolve_aliases(query, None);
        let mut child = RenderContext::for_query(self.dialect, &query);
        let sql = crate::compiler::render_plain(&mut child, &query)?;
        self.params.append(&mut child.params);
        Ok(sql)
    }

    pub fn params(&self) -> &[BindParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<BindParam> {
        self.params
    }

    fn lookup(&self, column: &Column) -> Option<&sqlbridge_core::ColumnMeta> {
        let name = column.name.as_deref()?;
        let meta = match column.alias.as_deref() {
            Some(alias) => self.tables.iter().find(|(a, meta)| {
                a.as_deref() == Some(alias) || meta.name.eq_ignore_ascii_case(alias)
            }),
            None => self.tables.first(),
        }?;
        meta.1.column(name)
    }
}

fn render_function(function: &str, inner: &str) -> String {
    let upper = function.trim().to_ascii_uppercase();
    match upper.as_str() {
        "COUNT_DISTINCT" | "COUNT DISTINCT" => format!("COUNT(DISTINCT {})", inner),
        _ => format!("{}({})", function.trim(), inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnOperator;
    use crate::dialect::{MysqlDialect, OracleDialect, PostgresDialect};
    use sqlbridge_core::ColumnMeta;

    fn users() -> Arc<TableMeta> {
        Arc::new(
            TableMeta::builder("users")
                .column(ColumnMeta::integer("id").primary_key())
                .column(ColumnMeta::decimal("balance", 12, 4))
                .column(ColumnMeta::varchar("bio", 0).subtype(ColumnSubtype::Clob))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_column_rendering() {
        let ctx = RenderContext::new(&MysqlDialect);
        assert_eq!(ctx.column(&Column::new("id")).unwrap(), "id");
        assert_eq!(ctx.column(&Column::of("u", "id")).unwrap(), "u.id");
        assert_eq!(ctx.column(&Column::all("u")).unwrap(), "u.*");
        assert_eq!(
            ctx.column(&Column::new("id").function("COUNT")).unwrap(),
            "COUNT(id)"
        );
        assert_eq!(
            ctx.column(&Column::new("id").function("count_distinct"))
                .unwrap(),
            "COUNT(DISTINCT id)"
        );
    }

    #[test]
    fn test_operator_applies_before_function() {
        let ctx = RenderContext::new(&OracleDialect);
        let col = Column::new("flags")
            .op(ColumnOperator::BitAnd, 4)
            .function("SUM");
        assert_eq!(ctx.column(&col).unwrap(), "SUM(BITAND(flags, 4))");
    }

    #[test]
    fn test_bind_value_uses_declared_metadata() {
        let query = Query::table(users());
        let mut ctx = RenderContext::for_query(&PostgresDialect, &query);
        ctx.bind_value(Some(&Column::new("balance")), Value::Double(1.5));
        ctx.bind_value(Some(&Column::new("balance").function("ABS")), Value::Int(1));
        let params = ctx.into_params();
        assert_eq!(params[0].semantic_type, Some(SemanticType::Decimal));
        assert_eq!(params[0].scale, Some(4));
        assert_eq!(params[0].column.as_deref(), Some("balance"));
        assert_eq!(params[1].semantic_type, Some(SemanticType::Integer));
        assert_eq!(params[1].column, None);
    }

    #[test]
    fn test_lookup_by_alias() {
        let query = Query::table(users()).alias("u");
        let mut ctx = RenderContext::for_query(&MysqlDialect, &query);
        ctx.bind_value(Some(&Column::of("u", "bio")), Value::from("hello"));
        ctx.bind_value(Some(&Column::of("x", "bio")), Value::from("hello"));
        let params = ctx.into_params();
        assert_eq!(params[0].subtype, ColumnSubtype::Clob);
        assert_eq!(params[1].subtype, ColumnSubtype::Default);
    }

    #[test]
    fn test_restrict_casing_quotes() {
        let meta = Arc::new(
            TableMeta::builder("Users")
                .sensitivity(CaseSensitivity::Restrict)
                .column(ColumnMeta::integer("Id"))
                .build()
                .unwrap(),
        );
        let query = Query::table(meta);
        let ctx = RenderContext::for_query(&PostgresDialect, &query);
        assert_eq!(ctx.column(&Column::new("Id")).unwrap(), "\"Id\"");
    }
}
