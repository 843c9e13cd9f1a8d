//! Db2 DDL and catalog.

use super::{SchemaDialect, char_length, decimal_args, varchar_length};
use crate::ddl;
use crate::introspect::LiveColumn;
use crate::types::ParsedSqlType;
use sqlbridge_core::{ColumnMeta, ColumnSubtype, Result, SemanticType, TableMeta};
use sqlbridge_query::Db2Dialect;

impl SchemaDialect for Db2Dialect {
    /// Db2 has no JSON column type.
    fn native_type(&self, column: &ColumnMeta) -> Option<String> {
        use ColumnSubtype as S;
        use SemanticType as T;
        Some(match (column.semantic_type, column.subtype) {
            (T::String, S::Char) => format!("CHAR({})", char_length(column)),
            (T::String, S::Text | S::Clob) => "CLOB".to_string(),
            (T::String, S::Blob | S::Binary) => "BLOB".to_string(),
            (T::String, _) => format!("VARCHAR({})", varchar_length(column)),
            (T::Binary, _) => match column.length {
                Some(n) => format!("VARBINARY({})", n),
                None => "BLOB".to_string(),
            },
            (T::Boolean | T::Byte | T::Short, _) => "SMALLINT".to_string(),
            (T::Integer, _) => "INTEGER".to_string(),
            (T::Long, _) => "BIGINT".to_string(),
            (T::Float, _) => "REAL".to_string(),
            (T::Double, _) => "DOUBLE".to_string(),
            (T::Decimal, _) => {
                let (p, s) = decimal_args(column);
                format!("DECIMAL({},{})", p, s)
            }
            (T::Date, S::DateOnly) => "DATE".to_string(),
            (T::Date, S::TimeOnly) => "TIME".to_string(),
            (T::Date, S::Year) => "INTEGER".to_string(),
            (T::Date, S::EpochMillis) => "BIGINT".to_string(),
            (T::Date, _) => "TIMESTAMP".to_string(),
            (T::Json, _) => return None,
            (T::Uuid, _) => "CHAR(36)".to_string(),
        })
    }

    fn canonical_type_name(&self, raw: &str) -> String {
        let base = ParsedSqlType::parse(raw).base_type;
        match base.as_str() {
            "CHARACTER" => "CHAR".to_string(),
            "INT" => "INTEGER".to_string(),
            "NUMERIC" => "DECIMAL".to_string(),
            "DOUBLE PRECISION" | "FLOAT" => "DOUBLE".to_string(),
            _ => base,
        }
    }

    /// Separate `ALTER COLUMN` clauses for type, default and nullability.
    fn modify_column(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        _live: &LiveColumn,
    ) -> Result<String> {
        let name = ddl::column_name(self, table, &column.name);
        let ty = self
            .column_type(column)
            .map_err(|e| e.with_table(&table.name))?;
        let mut sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {}",
            ddl::table_name(self, table),
            name,
            ty
        );
        if !column.auto_generated {
            match &column.default {
                Some(default) => {
                    sql.push_str(&format!(" ALTER COLUMN {} SET DEFAULT {}", name, default));
                }
                None => sql.push_str(&format!(" ALTER COLUMN {} DROP DEFAULT", name)),
            }
        }
        if !column.primary_key {
            let change = if column.nullable { "DROP" } else { "SET" };
            sql.push_str(&format!(" ALTER COLUMN {} {} NOT NULL", name, change));
        }
        Ok(sql)
    }

    fn supports_on_update(&self) -> bool {
        false
    }

    fn table_sql(&self) -> &'static str {
        "SELECT TABNAME AS table_name, REMARKS AS table_comment \
         FROM SYSCAT.TABLES \
         WHERE TABSCHEMA = CURRENT SCHEMA AND TABNAME = ?"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.COLNAME AS column_name, c.TYPENAME AS data_type, \
         c.LENGTH AS char_length, c.LENGTH AS num_precision, c.SCALE AS num_scale, \
         c.NULLS AS is_nullable, c.DEFAULT AS column_default, \
         CASE WHEN c.KEYSEQ IS NOT NULL THEN 1 ELSE 0 END AS is_pk, \
         CASE WHEN c.IDENTITY = 'Y' THEN 1 ELSE 0 END AS is_identity, \
         c.COLNO AS ordinal, c.REMARKS AS column_comment \
         FROM SYSCAT.COLUMNS c \
         WHERE c.TABSCHEMA = CURRENT SCHEMA AND c.TABNAME = ? \
         ORDER BY c.COLNO"
    }

    fn constraints_sql(&self) -> &'static str {
        "SELECT CONSTNAME AS constraint_name \
         FROM SYSCAT.TABCONST \
         WHERE TABSCHEMA = CURRENT SCHEMA AND TABNAME = ?"
    }
}
