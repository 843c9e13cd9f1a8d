//! Per-database strategies.
//!
//! A [`Dialect`] is a stateless strategy object: identifier casing,
//! operator rendering, clause builders, pagination and pre-binding. Every
//! method has a default built on the shared renderers in [`crate::clause`],
//! so each concrete dialect overrides only what its database spells
//! differently. Dialects that share behavior delegate to each other
//! explicitly instead of layering overrides.

mod db2;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlserver;

pub use db2::Db2Dialect;
pub use h2::H2Dialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlserver::SqlServerDialect;

use crate::bind::BoundValue;
use crate::clause::{self, Order, SelectParts};
use crate::column::{Column, ColumnOperator};
use crate::compiler::{self, CompiledQuery};
use crate::condition::Condition;
use crate::context::{BindParam, RenderContext};
use crate::join::Join;
use crate::pagination;
use crate::query::{FromClause, Page, Query};
use sqlbridge_core::{
    CaseSensitivity, CompileOptions, DatabaseKind, NativeCase, Result, quote_ident,
};
use std::fmt;

/// Upcast to a trait object from inside default methods.
pub trait AsDialect {
    fn as_dialect(&self) -> &dyn Dialect;
}

impl<T: Dialect> AsDialect for T {
    fn as_dialect(&self) -> &dyn Dialect {
        self
    }
}

/// Strategy for one database product.
pub trait Dialect: AsDialect + Send + Sync + fmt::Debug {
    /// Product this dialect targets.
    fn kind(&self) -> DatabaseKind;

    /// Selection key, used in logs and errors.
    fn name(&self) -> &'static str {
        self.kind().key()
    }

    /// How the database folds unquoted identifiers in its catalog.
    fn native_case(&self) -> NativeCase;

    /// Quote an identifier exactly as written.
    fn quote_identifier(&self, name: &str) -> String {
        quote_ident(name)
    }

    /// Write an identifier under a casing mode.
    fn render_cased_identifier(&self, name: &str, mode: CaseSensitivity) -> String {
        match mode {
            CaseSensitivity::Restrict => self.quote_identifier(name),
            other => other.fold(name),
        }
    }

    /// Render a bitwise or arithmetic transform of a column reference.
    fn render_operator_expression(
        &self,
        op: ColumnOperator,
        column: &str,
        operand: Option<i64>,
    ) -> Result<String> {
        clause::native_operator(op, column, operand)
    }

    /// Whether `''` is stored as NULL, turning IS EMPTY into IS NULL.
    fn empty_string_is_null(&self) -> bool {
        false
    }

    fn supports_full_join(&self) -> bool {
        true
    }

    /// Whether paging needs every column qualified by a table alias.
    fn requires_paging_alias(&self) -> bool {
        false
    }

    fn select_list(&self, ctx: &mut RenderContext<'_>, query: &Query) -> Result<String> {
        clause::render_select_list(ctx, query)
    }

    fn from_clause(&self, ctx: &mut RenderContext<'_>, from: &FromClause) -> Result<String> {
        clause::render_from(ctx, from)
    }

    fn join_clause(&self, ctx: &mut RenderContext<'_>, join: &Join) -> Result<String> {
        clause::render_join(ctx, join)
    }

    fn where_clause(&self, ctx: &mut RenderContext<'_>, condition: &Condition) -> Result<String> {
        clause::render_predicate(ctx, condition)
    }

    fn group_clause(&self, ctx: &mut RenderContext<'_>, columns: &[Column]) -> Result<String> {
        clause::render_group(ctx, columns)
    }

    fn having_clause(&self, ctx: &mut RenderContext<'_>, condition: &Condition) -> Result<String> {
        clause::render_predicate(ctx, condition)
    }

    fn order_clause(&self, ctx: &mut RenderContext<'_>, orders: &[Order]) -> Result<String> {
        clause::render_order(ctx, orders)
    }

    /// Turn rendered parts into a paginated statement.
    fn paginate(
        &self,
        ctx: &mut RenderContext<'_>,
        parts: SelectParts,
        page: Page,
    ) -> Result<String> {
        Ok(pagination::limit_offset(ctx, &parts, page))
    }

    fn compile_select(
        &self,
        query: &Query,
        page: Option<Page>,
        options: &CompileOptions,
    ) -> Result<CompiledQuery> {
        compiler::compile_select(self.as_dialect(), query, page, options)
    }

    fn compile_count(&self, query: &Query, options: &CompileOptions) -> Result<CompiledQuery> {
        compiler::compile_count(self.as_dialect(), query, options)
    }

    /// First refusal on binding a non-null parameter.
    ///
    /// `Ok(None)` hands the value to the generic marshaller.
    fn pre_bind(&self, param: &BindParam) -> Result<Option<BoundValue>> {
        let _ = param;
        Ok(None)
    }
}

static MYSQL: MysqlDialect = MysqlDialect;
static POSTGRES: PostgresDialect = PostgresDialect;
static ORACLE: OracleDialect = OracleDialect;
static SQLSERVER: SqlServerDialect = SqlServerDialect;
static H2: H2Dialect = H2Dialect;
static DB2: Db2Dialect = Db2Dialect;

/// The shared strategy for a database product.
pub fn dialect_for(kind: DatabaseKind) -> &'static dyn Dialect {
    match kind {
        DatabaseKind::Mysql => &MYSQL,
        DatabaseKind::Postgres => &POSTGRES,
        DatabaseKind::Oracle => &ORACLE,
        DatabaseKind::SqlServer => &SQLSERVER,
        DatabaseKind::H2 => &H2,
        DatabaseKind::Db2 => &DB2,
    }
}

/// Resolve a case-insensitive product key to its strategy.
pub fn dialect_for_key(key: &str) -> Result<&'static dyn Dialect> {
    DatabaseKind::from_key(key).map(dialect_for)
}

/// Every registered strategy.
pub fn all() -> [&'static dyn Dialect; 6] {
    DatabaseKind::ALL.map(dialect_for)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_kinds() {
        for kind in DatabaseKind::ALL {
            assert_eq!(dialect_for(kind).kind(), kind);
        }
        assert_eq!(dialect_for_key("MSSQL").unwrap().kind(), DatabaseKind::SqlServer);
        assert!(dialect_for_key("informix").is_err());
    }

    #[test]
    fn test_cased_identifiers() {
        let pg = dialect_for(DatabaseKind::Postgres);
        assert_eq!(pg.render_cased_identifier("UserName", CaseSensitivity::Default), "UserName");
        assert_eq!(pg.render_cased_identifier("UserName", CaseSensitivity::Upper), "USERNAME");
        assert_eq!(pg.render_cased_identifier("UserName", CaseSensitivity::Lower), "username");
        assert_eq!(
            pg.render_cased_identifier("UserName", CaseSensitivity::Restrict),
            "\"UserName\""
        );
        let mysql = dialect_for(DatabaseKind::Mysql);
        assert_eq!(
            mysql.render_cased_identifier("UserName", CaseSensitivity::Restrict),
            "`UserName`"
        );
        let mssql = dialect_for(DatabaseKind::SqlServer);
        assert_eq!(
            mssql.render_cased_identifier("UserName", CaseSensitivity::Restrict),
            "[UserName]"
        );
    }

    #[test]
    fn test_native_cases() {
        assert_eq!(dialect_for(DatabaseKind::Oracle).native_case(), NativeCase::Upper);
        assert_eq!(dialect_for(DatabaseKind::H2).native_case(), NativeCase::Upper);
        assert_eq!(dialect_for(DatabaseKind::Db2).native_case(), NativeCase::Upper);
        assert_eq!(dialect_for(DatabaseKind::Postgres).native_case(), NativeCase::Lower);
        assert_eq!(dialect_for(DatabaseKind::Mysql).native_case(), NativeCase::AsWritten);
        assert_eq!(dialect_for(DatabaseKind::SqlServer).native_case(), NativeCase::AsWritten);
    }

    #[test]
    fn test_trait_object_compiles_through_default() {
        let d = dialect_for(DatabaseKind::Mysql);
        let c = d
            .compile_select(&Query::table("t"), None, &CompileOptions::default())
            .unwrap();
        assert_eq!(c.sql, "SELECT * FROM t");
    }
}
