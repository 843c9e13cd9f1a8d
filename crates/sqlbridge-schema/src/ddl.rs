//! Shared DDL statement shapes.
//!
//! These are the forms most databases agree on. Dialects reach them through
//! the default methods of [`SchemaDialect`] and replace only what differs.

use crate::dialect::SchemaDialect;
use sqlbridge_core::{ColumnMeta, ForeignKey, Result, TableMeta, UniqueConstraint, quote_literal};

/// Table name as written in DDL.
pub fn table_name(d: &dyn SchemaDialect, table: &TableMeta) -> String {
    d.render_cased_identifier(&table.name, table.sensitivity)
}

/// Column or constraint name as written in DDL for `table`.
pub fn column_name(d: &dyn SchemaDialect, table: &TableMeta, name: &str) -> String {
    d.render_cased_identifier(name, table.sensitivity)
}

fn name_list<'a>(
    d: &dyn SchemaDialect,
    table: &TableMeta,
    names: impl IntoIterator<Item = &'a str>,
) -> String {
    names
        .into_iter()
        .map(|n| column_name(d, table, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `name TYPE [identity] [DEFAULT x] [NOT NULL] [COMMENT '...']`.
///
/// Generated columns carry the identity clause instead of a default. The
/// inline comment is written only for dialects that keep comments inline.
pub fn column_definition(
    d: &dyn SchemaDialect,
    table: &TableMeta,
    column: &ColumnMeta,
) -> Result<String> {
    let ty = d.column_type(column).map_err(|e| e.with_table(&table.name))?;
    let mut sql = format!("{} {}", column_name(d, table, &column.name), ty);
    if column.auto_generated {
        sql.push(' ');
        sql.push_str(d.identity_clause());
    } else if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if d.inline_comments() {
        if let Some(comment) = &column.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&quote_literal(comment));
        }
    }
    Ok(sql)
}

/// `CREATE TABLE t (defs..., PRIMARY KEY (pk...))` over active columns.
pub fn create_table(d: &dyn SchemaDialect, table: &TableMeta) -> Result<String> {
    let mut parts = table
        .active_columns()
        .map(|c| d.column_definition(table, c))
        .collect::<Result<Vec<_>>>()?;
    let pk = table.primary_key();
    if !pk.is_empty() {
        parts.push(format!("PRIMARY KEY ({})", name_list(d, table, pk)));
    }
    let mut sql = format!("CREATE TABLE {} ({})", table_name(d, table), parts.join(", "));
    if d.inline_comments() {
        if let Some(comment) = &table.comment {
            sql.push_str(" COMMENT = ");
            sql.push_str(&quote_literal(comment));
        }
    }
    Ok(sql)
}

pub fn comment_on_table(d: &dyn SchemaDialect, table: &TableMeta, comment: &str) -> String {
    format!(
        "COMMENT ON TABLE {} IS {}",
        table_name(d, table),
        quote_literal(comment)
    )
}

pub fn comment_on_column(
    d: &dyn SchemaDialect,
    table: &TableMeta,
    column: &ColumnMeta,
    comment: &str,
) -> String {
    format!(
        "COMMENT ON COLUMN {}.{} IS {}",
        table_name(d, table),
        column_name(d, table, &column.name),
        quote_literal(comment)
    )
}

pub fn add_unique(d: &dyn SchemaDialect, table: &TableMeta, unique: &UniqueConstraint) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
        table_name(d, table),
        column_name(d, table, &unique.name),
        name_list(d, table, unique.columns.iter().map(String::as_str))
    )
}

pub fn add_foreign_key(d: &dyn SchemaDialect, table: &TableMeta, fk: &ForeignKey) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        table_name(d, table),
        column_name(d, table, &fk.name),
        name_list(d, table, fk.columns.iter().map(String::as_str)),
        column_name(d, table, &fk.ref_table),
        name_list(d, table, fk.ref_columns.iter().map(String::as_str))
    );
    if let Some(action) = fk.on_delete {
        sql.push_str(" ON DELETE ");
        sql.push_str(action.as_sql());
    }
    if let Some(action) = fk.on_update.filter(|_| d.supports_on_update()) {
        sql.push_str(" ON UPDATE ");
        sql.push_str(action.as_sql());
    }
    sql
}

/// The column definition minus identity and comment, for ALTER forms that
/// accept only type, default and nullability.
pub(crate) fn plain_definition(
    d: &dyn SchemaDialect,
    table: &TableMeta,
    column: &ColumnMeta,
) -> Result<String> {
    let ty = d.column_type(column).map_err(|e| e.with_table(&table.name))?;
    let mut sql = format!("{} {}", column_name(d, table, &column.name), ty);
    if let Some(default) = column.default.as_ref().filter(|_| !column.auto_generated) {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::schema_dialect_for;
    use sqlbridge_core::{CaseSensitivity, DatabaseKind, ReferentialAction};

    fn users() -> TableMeta {
        TableMeta::builder("users")
            .column(ColumnMeta::integer("id").primary_key())
            .column(ColumnMeta::varchar("email", 255).not_null())
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_table_with_primary_key() {
        let pg = schema_dialect_for(DatabaseKind::Postgres);
        assert_eq!(
            create_table(pg, &users()).unwrap(),
            "CREATE TABLE users (id INTEGER NOT NULL, email VARCHAR(255) NOT NULL, PRIMARY KEY (id))"
        );
    }

    #[test]
    fn test_create_table_skips_dropped_columns() {
        let table = TableMeta::builder("t")
            .column(ColumnMeta::integer("id").primary_key())
            .column(ColumnMeta::integer("old").dropped())
            .build()
            .unwrap();
        let sql = create_table(schema_dialect_for(DatabaseKind::H2), &table).unwrap();
        assert!(!sql.contains("old"));
    }

    #[test]
    fn test_restrict_mode_quotes_names() {
        let table = TableMeta::builder("UserAccount")
            .sensitivity(CaseSensitivity::Restrict)
            .column(ColumnMeta::integer("Id").primary_key())
            .build()
            .unwrap();
        let sql = create_table(schema_dialect_for(DatabaseKind::SqlServer), &table).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE [UserAccount] ([Id] INT NOT NULL, PRIMARY KEY ([Id]))"
        );
    }

    #[test]
    fn test_generated_column_has_no_default() {
        let c = ColumnMeta::integer("id")
            .primary_key()
            .auto_generated()
            .default_value("0");
        let pg = schema_dialect_for(DatabaseKind::Postgres);
        assert_eq!(
            column_definition(pg, &users(), &c).unwrap(),
            "id INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL"
        );
    }

    #[test]
    fn test_unsupported_type_carries_table() {
        let c = ColumnMeta::new("doc", sqlbridge_core::SemanticType::Json);
        let err = column_definition(schema_dialect_for(DatabaseKind::Db2), &users(), &c)
            .unwrap_err();
        assert_eq!(err.table(), Some("users"));
        assert_eq!(err.column(), Some("doc"));
    }

    #[test]
    fn test_foreign_key_actions() {
        let fk = ForeignKey::new("fk_orders_user", "user_id", "users", "id")
            .on_delete(ReferentialAction::Cascade)
            .on_update(ReferentialAction::Cascade);
        let table = TableMeta::builder("orders")
            .column(ColumnMeta::integer("id").primary_key())
            .column(ColumnMeta::integer("user_id"))
            .foreign_key(fk.clone())
            .build()
            .unwrap();
        assert_eq!(
            add_foreign_key(schema_dialect_for(DatabaseKind::Postgres), &table, &fk),
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_user FOREIGN KEY (user_id) \
             REFERENCES users (id) ON DELETE CASCADE ON UPDATE CASCADE"
        );
        assert_eq!(
            add_foreign_key(schema_dialect_for(DatabaseKind::Oracle), &table, &fk),
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_user FOREIGN KEY (user_id) \
             REFERENCES users (id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_comment_statements_escape_quotes() {
        let table = TableMeta::builder("users")
            .comment("who's who")
            .column(ColumnMeta::integer("id"))
            .build()
            .unwrap();
        assert_eq!(
            comment_on_table(schema_dialect_for(DatabaseKind::Oracle), &table, "who's who"),
            "COMMENT ON TABLE users IS 'who''s who'"
        );
    }
}
