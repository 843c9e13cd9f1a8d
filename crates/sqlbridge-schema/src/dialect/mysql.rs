//! MySQL / MariaDB DDL and catalog.

use super::{SchemaDialect, char_length, decimal_args, varchar_length};
use crate::ddl;
use crate::introspect::LiveColumn;
use crate::types::ParsedSqlType;
use sqlbridge_core::{
    ColumnMeta, ColumnSubtype, Result, SemanticType, TableMeta, quote_literal,
};
use sqlbridge_query::MysqlDialect;

impl SchemaDialect for MysqlDialect {
    fn native_type(&self, column: &ColumnMeta) -> Option<String> {
        use ColumnSubtype as S;
        use SemanticType as T;
        Some(match (column.semantic_type, column.subtype) {
            (T::String, S::Char) => format!("CHAR({})", char_length(column)),
            (T::String, S::Text) => "TEXT".to_string(),
            (T::String, S::Clob) => "LONGTEXT".to_string(),
            (T::String, S::Blob | S::Binary) | (T::Binary, _) => match column.length {
                Some(n) if column.subtype != S::Blob => format!("VARBINARY({})", n),
                _ => "LONGBLOB".to_string(),
            },
            (T::String, _) => format!("VARCHAR({})", varchar_length(column)),
            (T::Boolean, _) => "TINYINT(1)".to_string(),
            (T::Byte, _) => "TINYINT".to_string(),
            (T::Short, _) => "SMALLINT".to_string(),
            (T::Integer, _) => "INT".to_string(),
            (T::Long, _) => "BIGINT".to_string(),
            (T::Float, _) => "FLOAT".to_string(),
            (T::Double, _) => "DOUBLE".to_string(),
            (T::Decimal, _) => {
                let (p, s) = decimal_args(column);
                format!("DECIMAL({},{})", p, s)
            }
            (T::Date, S::DateOnly) => "DATE".to_string(),
            (T::Date, S::TimeOnly) => "TIME".to_string(),
            (T::Date, S::Year) => "INT".to_string(),
            (T::Date, S::EpochMillis) => "BIGINT".to_string(),
            (T::Date, _) => "DATETIME".to_string(),
            (T::Json, _) => "JSON".to_string(),
            (T::Uuid, _) => "CHAR(36)".to_string(),
        })
    }

    fn canonical_type_name(&self, raw: &str) -> String {
        let base = ParsedSqlType::parse(raw).base_type;
        match base.as_str() {
            "INTEGER" => "INT".to_string(),
            "BOOL" | "BOOLEAN" => "TINYINT".to_string(),
            "NUMERIC" => "DECIMAL".to_string(),
            _ => base,
        }
    }

    fn identity_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn inline_comments(&self) -> bool {
        true
    }

    fn modify_column(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        _live: &LiveColumn,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            ddl::table_name(self, table),
            self.column_definition(table, column)?
        ))
    }

    fn table_comment(&self, table: &TableMeta, _replacing: bool) -> Option<String> {
        let comment = table.comment.as_deref()?;
        Some(format!(
            "ALTER TABLE {} COMMENT = {}",
            ddl::table_name(self, table),
            quote_literal(comment)
        ))
    }

    fn column_comment(
        &self,
        _table: &TableMeta,
        _column: &ColumnMeta,
        _replacing: bool,
    ) -> Option<String> {
        None
    }

    fn table_sql(&self) -> &'static str {
        "SELECT TABLE_NAME AS table_name, TABLE_COMMENT AS table_comment \
         FROM information_schema.TABLES \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.COLUMN_NAME AS column_name, c.DATA_TYPE AS data_type, \
         c.CHARACTER_MAXIMUM_LENGTH AS char_length, c.NUMERIC_PRECISION AS num_precision, \
         c.NUMERIC_SCALE AS num_scale, c.IS_NULLABLE AS is_nullable, \
         c.COLUMN_DEFAULT AS column_default, \
         CASE WHEN c.COLUMN_KEY = 'PRI' THEN 1 ELSE 0 END AS is_pk, \
         CASE WHEN c.EXTRA LIKE '%auto_increment%' THEN 1 ELSE 0 END AS is_identity, \
         c.ORDINAL_POSITION AS ordinal, c.COLUMN_COMMENT AS column_comment \
         FROM information_schema.COLUMNS c \
         WHERE c.TABLE_SCHEMA = DATABASE() AND c.TABLE_NAME = ? \
         ORDER BY c.ORDINAL_POSITION"
    }

    fn constraints_sql(&self) -> &'static str {
        "SELECT CONSTRAINT_NAME AS constraint_name \
         FROM information_schema.TABLE_CONSTRAINTS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableMeta {
        TableMeta::builder("users")
            .comment("accounts")
            .column(ColumnMeta::integer("id").primary_key().auto_generated())
            .column(ColumnMeta::varchar("email", 120).not_null().comment("login"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_inline_comments_in_create() {
        assert_eq!(
            MysqlDialect.create_table(&users()).unwrap(),
            "CREATE TABLE users (id INT AUTO_INCREMENT NOT NULL, \
             email VARCHAR(120) NOT NULL COMMENT 'login', PRIMARY KEY (id)) COMMENT = 'accounts'"
        );
        let table = users();
        assert_eq!(MysqlDialect.column_comment(&table, &table.columns[1], false), None);
    }

    #[test]
    fn test_modify_column_uses_full_definition() {
        let table = users();
        let live = LiveColumn::new("email", "varchar");
        assert_eq!(
            MysqlDialect
                .modify_column(&table, &table.columns[1], &live)
                .unwrap(),
            "ALTER TABLE users MODIFY COLUMN email VARCHAR(120) NOT NULL COMMENT 'login'"
        );
    }

    #[test]
    fn test_canonical_synonyms() {
        assert_eq!(MysqlDialect.canonical_type_name("integer"), "INT");
        assert_eq!(MysqlDialect.canonical_type_name("tinyint(1)"), "TINYINT");
        assert_eq!(MysqlDialect.canonical_type_name("varchar"), "VARCHAR");
    }

    #[test]
    fn test_blob_subtypes() {
        let blob = ColumnMeta::new("data", SemanticType::String)
            .subtype(ColumnSubtype::Blob)
            .length(16);
        assert_eq!(MysqlDialect.native_type(&blob).unwrap(), "LONGBLOB");
        let bin = ColumnMeta::new("hash", SemanticType::Binary).length(32);
        assert_eq!(MysqlDialect.native_type(&bin).unwrap(), "VARBINARY(32)");
    }
}
