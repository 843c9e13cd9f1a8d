//! H2 DDL and catalog.

use super::{SchemaDialect, char_length, decimal_args, varchar_length};
use crate::ddl;
use crate::introspect::LiveColumn;
use crate::types::ParsedSqlType;
use sqlbridge_core::{ColumnMeta, ColumnSubtype, Result, SemanticType, TableMeta};
use sqlbridge_query::H2Dialect;

impl SchemaDialect for H2Dialect {
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
            (T::Boolean, _) => "BOOLEAN".to_string(),
            (T::Byte, _) => "TINYINT".to_string(),
            (T::Short, _) => "SMALLINT".to_string(),
            (T::Integer, _) => "INTEGER".to_string(),
            (T::Long, _) => "BIGINT".to_string(),
            (T::Float, _) => "REAL".to_string(),
            (T::Double, _) => "DOUBLE PRECISION".to_string(),
            (T::Decimal, _) => {
                let (p, s) = decimal_args(column);
                format!("NUMERIC({},{})", p, s)
            }
            (T::Date, S::DateOnly) => "DATE".to_string(),
            (T::Date, S::TimeOnly) => "TIME".to_string(),
            (T::Date, S::Year) => "INTEGER".to_string(),
            (T::Date, S::EpochMillis) => "BIGINT".to_string(),
            (T::Date, _) => "TIMESTAMP".to_string(),
            (T::Json, _) => "JSON".to_string(),
            (T::Uuid, _) => "UUID".to_string(),
        })
    }

    fn canonical_type_name(&self, raw: &str) -> String {
        let base = ParsedSqlType::parse(raw).base_type;
        match base.as_str() {
            "CHARACTER VARYING" => "VARCHAR".to_string(),
            "CHARACTER" => "CHAR".to_string(),
            "CHARACTER LARGE OBJECT" => "CLOB".to_string(),
            "BINARY LARGE OBJECT" => "BLOB".to_string(),
            "BINARY VARYING" => "VARBINARY".to_string(),
            "INT" => "INTEGER".to_string(),
            "DECIMAL" => "NUMERIC".to_string(),
            "DOUBLE" | "FLOAT" => "DOUBLE PRECISION".to_string(),
            _ => base,
        }
    }

    fn modify_column(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        _live: &LiveColumn,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            ddl::table_name(self, table),
            self.column_definition(table, column)?
        ))
    }

    fn table_sql(&self) -> &'static str {
        "SELECT TABLE_NAME AS table_name, REMARKS AS table_comment \
         FROM INFORMATION_SCHEMA.TABLES \
         WHERE TABLE_SCHEMA = SCHEMA() AND TABLE_NAME = ?"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.COLUMN_NAME AS column_name, c.DATA_TYPE AS data_type, \
         c.CHARACTER_MAXIMUM_LENGTH AS char_length, c.NUMERIC_PRECISION AS num_precision, \
         c.NUMERIC_SCALE AS num_scale, c.IS_NULLABLE AS is_nullable, \
         c.COLUMN_DEFAULT AS column_default, \
         CASE WHEN EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
         JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k \
         ON k.CONSTRAINT_NAME = tc.CONSTRAINT_NAME AND k.TABLE_SCHEMA = tc.TABLE_SCHEMA \
         WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' AND tc.TABLE_SCHEMA = c.TABLE_SCHEMA \
         AND tc.TABLE_NAME = c.TABLE_NAME AND k.COLUMN_NAME = c.COLUMN_NAME) \
         THEN 1 ELSE 0 END AS is_pk, \
         CASE WHEN c.IS_IDENTITY = 'YES' THEN 1 ELSE 0 END AS is_identity, \
         c.ORDINAL_POSITION AS ordinal, c.REMARKS AS column_comment \
         FROM INFORMATION_SCHEMA.COLUMNS c \
         WHERE c.TABLE_SCHEMA = SCHEMA() AND c.TABLE_NAME = ? \
         ORDER BY c.ORDINAL_POSITION"
    }

    fn constraints_sql(&self) -> &'static str {
        "SELECT CONSTRAINT_NAME AS constraint_name \
         FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS \
         WHERE TABLE_SCHEMA = SCHEMA() AND TABLE_NAME = ?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h2_catalog_type_names() {
        let d = H2Dialect;
        assert_eq!(d.canonical_type_name("CHARACTER VARYING"), "VARCHAR");
        assert_eq!(d.canonical_type_name("CHARACTER LARGE OBJECT"), "CLOB");
        assert_eq!(d.canonical_type_name("DECIMAL(10,2)"), "NUMERIC");
    }

    #[test]
    fn test_alter_column_definition() {
        let table = TableMeta::builder("items")
            .column(ColumnMeta::integer("qty").not_null().default_value("0"))
            .build()
            .unwrap();
        let live = LiveColumn::new("QTY", "INTEGER");
        assert_eq!(
            H2Dialect.modify_column(&table, &table.columns[0], &live).unwrap(),
            "ALTER TABLE items ALTER COLUMN qty INTEGER DEFAULT 0 NOT NULL"
        );
    }
}
