//! PostgreSQL DDL and catalog.

use super::{SchemaDialect, char_length, decimal_args, varchar_length};
use crate::ddl;
use crate::introspect::LiveColumn;
use crate::types::ParsedSqlType;
use sqlbridge_core::{ColumnMeta, ColumnSubtype, Result, SemanticType, TableMeta};
use sqlbridge_query::PostgresDialect;

impl SchemaDialect for PostgresDialect {
    fn native_type(&self, column: &ColumnMeta) -> Option<String> {
        use ColumnSubtype as S;
        use SemanticType as T;
        Some(match (column.semantic_type, column.subtype) {
            (T::String, S::Char) => format!("CHAR({})", char_length(column)),
            (T::String, S::Text | S::Clob) => "TEXT".to_string(),
            (T::String, S::Blob | S::Binary) | (T::Binary, _) => "BYTEA".to_string(),
            (T::String, _) => format!("VARCHAR({})", varchar_length(column)),
            (T::Boolean, _) => "BOOLEAN".to_string(),
            (T::Byte | T::Short, _) => "SMALLINT".to_string(),
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
            (T::Json, _) => "JSONB".to_string(),
            (T::Uuid, _) => "UUID".to_string(),
        })
    }

    fn canonical_type_name(&self, raw: &str) -> String {
        let base = ParsedSqlType::parse(raw).base_type;
        match base.as_str() {
            "CHARACTER VARYING" => "VARCHAR".to_string(),
            "CHARACTER" | "BPCHAR" => "CHAR".to_string(),
            "INT" | "INT4" => "INTEGER".to_string(),
            "INT2" => "SMALLINT".to_string(),
            "INT8" => "BIGINT".to_string(),
            "DECIMAL" => "NUMERIC".to_string(),
            "FLOAT4" => "REAL".to_string(),
            "FLOAT8" => "DOUBLE PRECISION".to_string(),
            "BOOL" => "BOOLEAN".to_string(),
            "TIMESTAMP WITHOUT TIME ZONE" => "TIMESTAMP".to_string(),
            "TIME WITHOUT TIME ZONE" => "TIME".to_string(),
            _ => base,
        }
    }

    /// One ALTER TABLE with separate type, default and nullability clauses.
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
        let mut clauses = vec![format!("ALTER COLUMN {} TYPE {}", name, ty)];
        if !column.auto_generated {
            clauses.push(match &column.default {
                Some(default) => format!("ALTER COLUMN {} SET DEFAULT {}", name, default),
                None => format!("ALTER COLUMN {} DROP DEFAULT", name),
            });
        }
        clauses.push(if column.nullable {
            format!("ALTER COLUMN {} DROP NOT NULL", name)
        } else {
            format!("ALTER COLUMN {} SET NOT NULL", name)
        });
        Ok(format!(
            "ALTER TABLE {} {}",
            ddl::table_name(self, table),
            clauses.join(", ")
        ))
    }

    fn table_sql(&self) -> &'static str {
        "SELECT t.table_name AS table_name, \
         obj_description(format('%I.%I', t.table_schema, t.table_name)::regclass, 'pg_class') \
         AS table_comment \
         FROM information_schema.tables t \
         WHERE t.table_schema = current_schema() AND t.table_name = ?"
    }

    fn columns_sql(&self) -> &'static str {
        "SELECT c.column_name AS column_name, c.data_type AS data_type, \
         c.character_maximum_length AS char_length, c.numeric_precision AS num_precision, \
         c.numeric_scale AS num_scale, c.is_nullable AS is_nullable, \
         c.column_default AS column_default, \
         CASE WHEN EXISTS (SELECT 1 FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage k \
         ON k.constraint_name = tc.constraint_name AND k.table_schema = tc.table_schema \
         WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = c.table_schema \
         AND tc.table_name = c.table_name AND k.column_name = c.column_name) \
         THEN 1 ELSE 0 END AS is_pk, \
         CASE WHEN c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%' \
         THEN 1 ELSE 0 END AS is_identity, \
         c.ordinal_position AS ordinal, \
         col_description(format('%I.%I', c.table_schema, c.table_name)::regclass, \
         c.ordinal_position) AS column_comment \
         FROM information_schema.columns c \
         WHERE c.table_schema = current_schema() AND c.table_name = ? \
         ORDER BY c.ordinal_position"
    }

    fn constraints_sql(&self) -> &'static str {
        "SELECT constraint_name AS constraint_name \
         FROM information_schema.table_constraints \
         WHERE table_schema = current_schema() AND table_name = ?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_catalog_names() {
        let d = PostgresDialect;
        assert_eq!(d.canonical_type_name("character varying"), "VARCHAR");
        assert_eq!(d.canonical_type_name("timestamp without time zone"), "TIMESTAMP");
        assert_eq!(d.canonical_type_name("numeric"), "NUMERIC");
        assert_eq!(d.canonical_type_name("DECIMAL(10,2)"), "NUMERIC");
        assert_eq!(d.canonical_type_name("double precision"), "DOUBLE PRECISION");
    }

    #[test]
    fn test_modify_column_clauses() {
        let table = TableMeta::builder("users")
            .column(ColumnMeta::integer("id").primary_key())
            .column(ColumnMeta::varchar("status", 20).not_null().default_value("'new'"))
            .build()
            .unwrap();
        let live = LiveColumn::new("status", "character varying");
        assert_eq!(
            PostgresDialect
                .modify_column(&table, &table.columns[1], &live)
                .unwrap(),
            "ALTER TABLE users ALTER COLUMN status TYPE VARCHAR(20), \
             ALTER COLUMN status SET DEFAULT 'new', ALTER COLUMN status SET NOT NULL"
        );
    }

    #[test]
    fn test_comment_on_column() {
        let table = TableMeta::builder("users")
            .column(ColumnMeta::integer("id").comment("surrogate key"))
            .build()
            .unwrap();
        assert_eq!(
            PostgresDialect
                .column_comment(&table, &table.columns[0], false)
                .unwrap(),
            "COMMENT ON COLUMN users.id IS 'surrogate key'"
        );
    }
}
