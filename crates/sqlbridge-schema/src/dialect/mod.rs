//! Schema-side dialect capabilities.
//!
//! [`SchemaDialect`] extends the query [`Dialect`] with everything DDL
//! generation and introspection need: the semantic-type table, statement
//! fragments, comment forms and the catalog queries. The shared statement
//! shapes live in [`crate::ddl`]; each database overrides only the forms it
//! spells differently.
//!
//! Catalog queries take the catalog-cased table name as their only
//! parameter and project the same aliases on every database:
//! `column_name`, `data_type`, `char_length`, `num_precision`, `num_scale`,
//! `is_nullable`, `column_default`, `is_pk`, `is_identity`, `ordinal`,
//! `column_comment` (columns); `table_name`, `table_comment` (tables);
//! `constraint_name` (constraints).

mod db2;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlserver;

use crate::ddl;
use crate::introspect::LiveColumn;
use crate::types::ParsedSqlType;
use sqlbridge_core::{
    ColumnMeta, DatabaseKind, ForeignKey, Result, TableMeta, UniqueConstraint,
    UnsupportedTypeError,
};
use sqlbridge_query::{
    Db2Dialect, Dialect, H2Dialect, MysqlDialect, OracleDialect, PostgresDialect,
    SqlServerDialect,
};

/// Upcast to a trait object from inside default methods.
pub trait AsSchemaDialect {
    fn as_schema_dialect(&self) -> &dyn SchemaDialect;
}

impl<T: SchemaDialect> AsSchemaDialect for T {
    fn as_schema_dialect(&self) -> &dyn SchemaDialect {
        self
    }
}

/// DDL and catalog strategy for one database product.
pub trait SchemaDialect: Dialect + AsSchemaDialect {
    /// Native type for a declared column, or `None` when the database has
    /// no mapping for its semantic type and subtype.
    fn native_type(&self, column: &ColumnMeta) -> Option<String>;

    /// Resolve the column type, honoring a declared override.
    fn column_type(&self, column: &ColumnMeta) -> Result<String> {
        if let Some(native) = &column.type_override {
            return Ok(native.clone());
        }
        self.native_type(column).ok_or_else(|| {
            UnsupportedTypeError {
                dialect: self.name(),
                semantic_type: column.semantic_type.to_string(),
                subtype: column.subtype.to_string(),
                table: None,
                column: Some(column.name.clone()),
            }
            .into()
        })
    }

    /// Canonical base name of a declared or catalog-reported type.
    fn canonical_type_name(&self, raw: &str) -> String {
        ParsedSqlType::parse(raw).base_type
    }

    /// Clause that marks a column as generated by the database.
    fn identity_clause(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    /// Whether comments are written inside column and table definitions.
    fn inline_comments(&self) -> bool {
        false
    }

    /// Whether foreign keys accept an `ON UPDATE` action.
    fn supports_on_update(&self) -> bool {
        true
    }

    fn column_definition(&self, table: &TableMeta, column: &ColumnMeta) -> Result<String> {
        ddl::column_definition(self.as_schema_dialect(), table, column)
    }

    fn create_table(&self, table: &TableMeta) -> Result<String> {
        ddl::create_table(self.as_schema_dialect(), table)
    }

    fn drop_table(&self, table: &TableMeta) -> String {
        format!("DROP TABLE {}", ddl::table_name(self.as_schema_dialect(), table))
    }

    fn add_column(&self, table: &TableMeta, column: &ColumnMeta) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            ddl::table_name(self.as_schema_dialect(), table),
            self.column_definition(table, column)?
        ))
    }

    fn drop_column(&self, table: &TableMeta, column: &ColumnMeta) -> String {
        let d = self.as_schema_dialect();
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            ddl::table_name(d, table),
            ddl::column_name(d, table, &column.name)
        )
    }

    /// Statement converging a live column onto its declaration.
    fn modify_column(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        live: &LiveColumn,
    ) -> Result<String>;

    /// Standalone table comment statement. `replacing` is set when the live
    /// table already carries a comment.
    fn table_comment(&self, table: &TableMeta, replacing: bool) -> Option<String> {
        let _ = replacing;
        let comment = table.comment.as_deref()?;
        Some(ddl::comment_on_table(self.as_schema_dialect(), table, comment))
    }

    /// Standalone column comment statement, `None` when comments are inline.
    fn column_comment(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        replacing: bool,
    ) -> Option<String> {
        let _ = replacing;
        let comment = column.comment.as_deref()?;
        Some(ddl::comment_on_column(
            self.as_schema_dialect(),
            table,
            column,
            comment,
        ))
    }

    fn add_unique(&self, table: &TableMeta, unique: &UniqueConstraint) -> String {
        ddl::add_unique(self.as_schema_dialect(), table, unique)
    }

    fn add_foreign_key(&self, table: &TableMeta, fk: &ForeignKey) -> String {
        ddl::add_foreign_key(self.as_schema_dialect(), table, fk)
    }

    /// Table name and comment for one table; no rows when absent.
    fn table_sql(&self) -> &'static str;

    /// Column snapshot for one table, in ordinal order.
    fn columns_sql(&self) -> &'static str;

    /// Names of every constraint on one table.
    fn constraints_sql(&self) -> &'static str;
}

pub(crate) fn varchar_length(column: &ColumnMeta) -> u32 {
    column.length.unwrap_or(255)
}

pub(crate) fn char_length(column: &ColumnMeta) -> u32 {
    column.length.unwrap_or(1)
}

pub(crate) fn decimal_args(column: &ColumnMeta) -> (u32, u32) {
    (column.precision.unwrap_or(19), column.scale.unwrap_or(2))
}

static MYSQL: MysqlDialect = MysqlDialect;
static POSTGRES: PostgresDialect = PostgresDialect;
static ORACLE: OracleDialect = OracleDialect;
static SQLSERVER: SqlServerDialect = SqlServerDialect;
static H2: H2Dialect = H2Dialect;
static DB2: Db2Dialect = Db2Dialect;

/// The shared schema strategy for a database product.
pub fn schema_dialect_for(kind: DatabaseKind) -> &'static dyn SchemaDialect {
    match kind {
        DatabaseKind::Mysql => &MYSQL,
        DatabaseKind::Postgres => &POSTGRES,
        DatabaseKind::Oracle => &ORACLE,
        DatabaseKind::SqlServer => &SQLSERVER,
        DatabaseKind::H2 => &H2,
        DatabaseKind::Db2 => &DB2,
    }
}

/// Resolve a case-insensitive product key to its schema strategy.
pub fn schema_dialect_for_key(key: &str) -> Result<&'static dyn SchemaDialect> {
    DatabaseKind::from_key(key).map(schema_dialect_for)
}
