//! Oracle DDL and catalog.

use super::{SchemaDialect, char_length, decimal_args, varchar_length};
use crate::ddl;
use crate::introspect::LiveColumn;
use sqlbridge_core::{ColumnMeta, ColumnSubtype, Result, SemanticType, TableMeta};
use sqlbridge_query::OracleDialect;

impl SchemaDialect for OracleDialect {
    /// Oracle has no TIME or JSON column type; both are unsupported.
    fn native_type(&self, column: &ColumnMeta) -> Option<String> {
        use ColumnSubtype as S;
        use SemanticType as T;
        Some(match (column.semantic_type, column.subtype) {
            (T::String, S::Char) => format!("CHAR({})", char_length(column)),
            (T::String, S::Text | S::Clob) => "CLOB".to_string(),
            (T::String, S::Blob | S::Binary) => "BLOB".to_string(),
            (T::String, _) => format!("VARCHAR2({})", varchar_length(column)),
            (T::Binary, _) => match column.length {
                Some(n) => format!("RAW({})", n),
                None => "BLOB".to_string(),
            },
            (T::Boolean, _) => "NUMBER(1)".to_string(),
            (T::Byte, _) => "NUMBER(3)".to_string(),
            (T::Short, _) => "NUMBER(5)".to_string(),
            (T::Integer, _) => "NUMBER(10)".to_string(),
            (T::Long, _) => "NUMBER(19)".to_string(),
            (T::Float, _) => "BINARY_FLOAT".to_string(),
            (T::Double, _) => "BINARY_DOUBLE".to_string(),
            (T::Decimal, _) => {
                let (p, s) = decimal_args(column);
                format!("NUMBER({},{})", p, s)
            }
            (T::Date, S::DateOnly) => "DATE".to_string(),
            (T::Date, S::TimeOnly) | (T::Json, _) => return None,
            (T::Date, S::Year) => "NUMBER(4)".to_string(),
            (T::Date, S::EpochMillis) => "NUMBER(20)".to_string(),
            (T::Date, _) => "TIMESTAMP".to_string(),
            (T::Uuid, _) => "VARCHAR2(36)".to_string(),
        })
    }

    fn add_column(&self, table: &TableMeta, column: &ColumnMeta) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD ({})",
            ddl::table_name(self, table),
            self.column_definition(table, column)?
        ))
    }

    /// `MODIFY (...)` rejects a nullability clause that matches the current
    /// state, so it is written only when nullability changes.
    fn modify_column(
        &self,
        table: &TableMeta,
        column: &ColumnMeta,
        live: &LiveColumn,
    ) -> Result<String> {
        let mut def = ddl::plain_definition(self, table, column)?;
        if column.default.is_none() && live.default.is_some() && !column.auto_generated {
            def.push_str(" DEFAULT NULL");
        }
        if column.nullable != live.nullable && !column.primary_key {
            def.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        }
        Ok(format!(
            "ALTER TABLE {} MODIFY ({})",
            ddl::table_name(self, table),
            def
        ))
    }

    fn supports_on_update(&self) -> bool {
        false
    }

    fn table_sql(&self) -> &'static str {
        "SELECT t.TABLE_NAME AS table_name, tc.COMMENTS AS table_comment \
         FROM USER_TABLES t \
         LEFT JOIN USER_TAB_COMMENTS tc ON tc.TABLE_NAME = t.TABLE_NAME \
         WHERE t.TABLE_NAME = ?"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.COLUMN_NAME AS column_name, c.DATA_TYPE AS data_type, \
         CASE WHEN c.DATA_TYPE = 'RAW' THEN c.DATA_LENGTH ELSE c.CHAR_LENGTH END AS char_length, \
         c.DATA_PRECISION AS num_precision, \
         c.DATA_SCALE AS num_scale, c.NULLABLE AS is_nullable, \
         c.DATA_DEFAULT AS column_default, \
         CASE WHEN EXISTS (SELECT 1 FROM USER_CONSTRAINTS uc \
         JOIN USER_CONS_COLUMNS ucc ON ucc.CONSTRAINT_NAME = uc.CONSTRAINT_NAME \
         WHERE uc.CONSTRAINT_TYPE = 'P' AND uc.TABLE_NAME = c.TABLE_NAME \
         AND ucc.COLUMN_NAME = c.COLUMN_NAME) THEN 1 ELSE 0 END AS is_pk, \
         CASE WHEN c.IDENTITY_COLUMN = 'YES' THEN 1 ELSE 0 END AS is_identity, \
         c.COLUMN_ID AS ordinal, cc.COMMENTS AS column_comment \
         FROM USER_TAB_COLUMNS c \
         LEFT JOIN USER_COL_COMMENTS cc \
         ON cc.TABLE_NAME = c.TABLE_NAME AND cc.COLUMN_NAME = c.COLUMN_NAME \
         WHERE c.TABLE_NAME = ? \
         ORDER BY c.COLUMN_ID"
    }

    fn constraints_sql(&self) -> &'static str {
        "SELECT CONSTRAINT_NAME AS constraint_name FROM USER_CONSTRAINTS WHERE TABLE_NAME = ?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableMeta {
        TableMeta::builder("accounts")
            .column(ColumnMeta::integer("id").primary_key())
            .column(ColumnMeta::varchar("name", 80).not_null())
            .column(ColumnMeta::new("created", SemanticType::Date).subtype(ColumnSubtype::EpochMillis))
            .build()
            .unwrap()
    }

    #[test]
    fn test_type_table() {
        let t = table();
        assert_eq!(OracleDialect.column_type(&t.columns[0]).unwrap(), "NUMBER(10)");
        assert_eq!(OracleDialect.column_type(&t.columns[1]).unwrap(), "VARCHAR2(80)");
        assert_eq!(OracleDialect.column_type(&t.columns[2]).unwrap(), "NUMBER(20)");
        let time = ColumnMeta::new("at", SemanticType::Date).subtype(ColumnSubtype::TimeOnly);
        assert!(OracleDialect.column_type(&time).unwrap_err().is_unsupported_type());
    }

    #[test]
    fn test_add_column_in_parentheses() {
        let t = table();
        assert_eq!(
            OracleDialect.add_column(&t, &t.columns[1]).unwrap(),
            "ALTER TABLE accounts ADD (name VARCHAR2(80) NOT NULL)"
        );
    }

    #[test]
    fn test_modify_writes_nullability_only_on_change() {
        let t = table();
        let mut live = LiveColumn::new("NAME", "VARCHAR2");
        live.nullable = false;
        assert_eq!(
            OracleDialect.modify_column(&t, &t.columns[1], &live).unwrap(),
            "ALTER TABLE accounts MODIFY (name VARCHAR2(80))"
        );
        live.nullable = true;
        assert_eq!(
            OracleDialect.modify_column(&t, &t.columns[1], &live).unwrap(),
            "ALTER TABLE accounts MODIFY (name VARCHAR2(80) NOT NULL)"
        );
    }

    #[test]
    fn test_modify_clears_stale_default() {
        let t = table();
        let mut live = LiveColumn::new("CREATED", "NUMBER");
        live.default = Some("0".to_string());
        assert_eq!(
            OracleDialect.modify_column(&t, &t.columns[2], &live).unwrap(),
            "ALTER TABLE accounts MODIFY (created NUMBER(20) DEFAULT NULL)"
        );
    }
}
