//! SQL Server DDL and catalog.

use super::{SchemaDialect, char_length, decimal_args, varchar_length};
use crate::ddl;
use crate::introspect::LiveColumn;
use crate::types::ParsedSqlType;
use sqlbridge_core::{
    ColumnMeta, ColumnSubtype, Result, SemanticType, TableMeta, quote_literal,
};
use sqlbridge_query::{Dialect, SqlServerDialect};

/// `sp_addextendedproperty` (or `sp_updateextendedproperty` when a
/// description already exists) for a table or one of its columns.
fn description(
    table: &TableMeta,
    column: Option<&ColumnMeta>,
    comment: &str,
    replacing: bool,
) -> String {
    let procedure = if replacing {
        "sp_updateextendedproperty"
    } else {
        "sp_addextendedproperty"
    };
    let catalog = |name: &str| {
        table
            .sensitivity
            .catalog_name(name, SqlServerDialect.native_case())
    };
    let mut sql = format!(
        "EXEC {} @name = N'MS_Description', @value = N{}, \
         @level0type = N'SCHEMA', @level0name = N'dbo', \
         @level1type = N'TABLE', @level1name = N{}",
        procedure,
        quote_literal(comment),
        quote_literal(&catalog(&table.name))
    );
    if let Some(column) = column {
        sql.push_str(&format!(
            ", @level2type = N'COLUMN', @level2name = N{}",
            quote_literal(&catalog(&column.name))
        ));
    }
    sql
}

impl SchemaDialect for SqlServerDialect {
    /// SQL Server has no JSON column type.
    fn native_type(&self, column: &ColumnMeta) -> Option<String> {
        use ColumnSubtype as S;
        use SemanticType as T;
        Some(match (column.semantic_type, column.subtype) {
            (T::String, S::Char) => format!("NCHAR({})", char_length(column)),
            (T::String, S::Text | S::Clob) => "NVARCHAR(MAX)".to_string(),
            (T::String, S::Blob | S::Binary) => "VARBINARY(MAX)".to_string(),
            (T::String, _) => format!("NVARCHAR({})", varchar_length(column)),
            (T::Binary, _) => match column.length {
                Some(n) => format!("VARBINARY({})", n),
                None => "VARBINARY(MAX)".to_string(),
            },
            (T::Boolean, _) => "BIT".to_string(),
            (T::Byte, _) => "TINYINT".to_string(),
            (T::Short, _) => "SMALLINT".to_string(),
            (T::Integer, _) => "INT".to_string(),
            (T::Long, _) => "BIGINT".to_string(),
            (T::Float, _) => "REAL".to_string(),
            (T::Double, _) => "FLOAT".to_string(),
            (T::Decimal, _) => {
                let (p, s) = decimal_args(column);
                format!("DECIMAL({},{})", p, s)
            }
            (T::Date, S::DateOnly) => "DATE".to_string(),
            (T::Date, S::TimeOnly) => "TIME".to_string(),
            (T::Date, S::Year) => "INT".to_string(),
            (T::Date, S::EpochMillis) => "BIGINT".to_string(),
            (T::Date, _) => "DATETIME2".to_string(),
            (T::Json, _) => return None,
            (T::Uuid, _) => "UNIQUEIDENTIFIER".to_string(),
        })
    }

    fn canonical_type_name(&self, raw: &str) -> String {
        let base = ParsedSqlType::parse(raw).base_type;
        match base.as_str() {
            "INTEGER" => "INT".to_string(),
            "NUMERIC" => "DECIMAL".to_string(),
            _ => base,
        }
    }

    fn identity_clause(&self) -> &'static str {
        "IDENTITY(1,1)"
    }

    fn add_column(&self, table: &TableMeta, column: &ColumnMeta) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD {}",
            ddl::table_name(self, table),
            self.column_definition(table, column)?
        ))
    }

    /// `ALTER COLUMN` restates type and nullability; defaults live in named
    /// constraints and are left alone.
    fn modify_column(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        _live: &LiveColumn,
    ) -> Result<String> {
        let ty = self
            .column_type(column)
            .map_err(|e| e.with_table(&table.name))?;
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} {} {}",
            ddl::table_name(self, table),
            ddl::column_name(self, table, &column.name),
            ty,
            if column.nullable { "NULL" } else { "NOT NULL" }
        ))
    }

    fn table_comment(&self, table: &TableMeta, replacing: bool) -> Option<String> {
        let comment = table.comment.as_deref()?;
        Some(description(table, None, comment, replacing))
    }

    fn column_comment(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        replacing: bool,
    ) -> Option<String> {
        let comment = column.comment.as_deref()?;
        Some(description(table, Some(column), comment, replacing))
    }

    fn table_sql(&self) -> &'static str {
        "SELECT t.TABLE_NAME AS table_name, \
         CAST(ep.value AS NVARCHAR(4000)) AS table_comment \
         FROM INFORMATION_SCHEMA.TABLES t \
         LEFT JOIN sys.extended_properties ep \
         ON ep.major_id = OBJECT_ID(t.TABLE_SCHEMA + '.' + t.TABLE_NAME) \
         AND ep.minor_id = 0 AND ep.name = 'MS_Description' \
         WHERE t.TABLE_NAME = ?"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.COLUMN_NAME AS column_name, c.DATA_TYPE AS data_type, \
         c.CHARACTER_MAXIMUM_LENGTH AS char_length, c.NUMERIC_PRECISION AS num_precision, \
         c.NUMERIC_SCALE AS num_scale, c.IS_NULLABLE AS is_nullable, \
         c.COLUMN_DEFAULT AS column_default, \
         CASE WHEN EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
         JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k ON k.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
         WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' AND tc.TABLE_NAME = c.TABLE_NAME \
         AND k.COLUMN_NAME = c.COLUMN_NAME) THEN 1 ELSE 0 END AS is_pk, \
         COLUMNPROPERTY(OBJECT_ID(c.TABLE_SCHEMA + '.' + c.TABLE_NAME), c.COLUMN_NAME, \
         'IsIdentity') AS is_identity, \
         c.ORDINAL_POSITION AS ordinal, \
         CAST(ep.value AS NVARCHAR(4000)) AS column_comment \
         FROM INFORMATION_SCHEMA.COLUMNS c \
         LEFT JOIN sys.extended_properties ep \
         ON ep.major_id = OBJECT_ID(c.TABLE_SCHEMA + '.' + c.TABLE_NAME) \
         AND ep.minor_id = COLUMNPROPERTY(OBJECT_ID(c.TABLE_SCHEMA + '.' + c.TABLE_NAME), \
         c.COLUMN_NAME, 'ColumnId') AND ep.name = 'MS_Description' \
         WHERE c.TABLE_NAME = ? \
         ORDER BY c.ORDINAL_POSITION"
    }

    fn constraints_sql(&self) -> &'static str {
        "SELECT CONSTRAINT_NAME AS constraint_name \
         FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS WHERE TABLE_NAME = ?"
    }
}
