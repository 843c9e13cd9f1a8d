//! Declared-versus-live schema diff.
//!
//! The diff is convergent toward the declaration: it adds missing columns,
//! drops columns explicitly marked dropped, rewrites columns whose type,
//! default or nullability drifted, and adds missing constraints. Live
//! columns with no declared counterpart are left alone.
//!
//! Statements come out in declared-column order, with constraint statements
//! after every column statement and comment statements last on creation.
//! A rename written as drop plus add can therefore pass through states that
//! violate a constraint; the order is kept stable rather than rearranged.

use crate::dialect::SchemaDialect;
use crate::introspect::{LiveColumn, LiveTable};
use crate::types::{ParsedSqlType, defaults_equal, normalize_default};
use sqlbridge_core::{
    ColumnMeta, ForeignKey, Result, TableMeta, UniqueConstraint, is_date_as_number,
};
use std::collections::HashSet;

/// A single schema change, rendered to SQL by a [`SchemaDialect`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOperation<'a> {
    /// Create the declared table with every active column.
    CreateTable,
    /// Drop the live table.
    DropTable,
    AddColumn(&'a ColumnMeta),
    DropColumn(&'a ColumnMeta),
    /// Rewrite a live column to match its declaration.
    ModifyColumn {
        column: &'a ColumnMeta,
        live: &'a LiveColumn,
    },
    TableComment {
        replacing: bool,
    },
    ColumnComment {
        column: &'a ColumnMeta,
        replacing: bool,
    },
    AddUnique(UniqueConstraint),
    AddForeignKey(&'a ForeignKey),
}

impl SchemaOperation<'_> {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaOperation::CreateTable => "create_table",
            SchemaOperation::DropTable => "drop_table",
            SchemaOperation::AddColumn(_) => "add_column",
            SchemaOperation::DropColumn(_) => "drop_column",
            SchemaOperation::ModifyColumn { .. } => "modify_column",
            SchemaOperation::TableComment { .. } => "table_comment",
            SchemaOperation::ColumnComment { .. } => "column_comment",
            SchemaOperation::AddUnique(_) => "add_unique",
            SchemaOperation::AddForeignKey(_) => "add_foreign_key",
        }
    }

    /// Render the operation for `table`; `None` when the dialect has no
    /// standalone statement for it.
    pub fn to_sql(&self, d: &dyn SchemaDialect, table: &TableMeta) -> Result<Option<String>> {
        Ok(match self {
            SchemaOperation::CreateTable => Some(d.create_table(table)?),
            SchemaOperation::DropTable => Some(d.drop_table(table)),
            SchemaOperation::AddColumn(column) => Some(d.add_column(table, column)?),
            SchemaOperation::DropColumn(column) => Some(d.drop_column(table, column)),
            SchemaOperation::ModifyColumn { column, live } => {
                Some(d.modify_column(table, column, live)?)
            }
            SchemaOperation::TableComment { replacing } => d.table_comment(table, *replacing),
            SchemaOperation::ColumnComment { column, replacing } => {
                d.column_comment(table, column, *replacing)
            }
            SchemaOperation::AddUnique(unique) => Some(d.add_unique(table, unique)),
            SchemaOperation::AddForeignKey(fk) => Some(d.add_foreign_key(table, fk)),
        })
    }
}

fn comment_changed(declared: Option<&str>, live: Option<&str>) -> bool {
    declared.is_some_and(|c| Some(c) != live)
}

fn has_constraint(constraints: &HashSet<String>, name: &str) -> bool {
    constraints.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// Whether a live column has drifted from its declaration.
///
/// Compared in order: the length of character and binary types, the
/// precision and scale of exact numerics, the canonical base type name, the
/// default (by value for numeric columns), then nullability. Primary-key
/// and generated columns are exempt from the nullability check, and
/// generated columns from the default check.
pub fn column_needs_update(
    d: &dyn SchemaDialect,
    column: &ColumnMeta,
    live: &LiveColumn,
) -> Result<bool> {
    let declared = ParsedSqlType::parse(&d.column_type(column)?);
    let date_as_number = is_date_as_number(column.semantic_type, column.subtype);

    if declared.is_text() && declared.length.is_some() && declared.length != live.char_length {
        return Ok(true);
    }
    if declared.is_decimal_family() && declared.precision.is_some() {
        let scale = if date_as_number {
            0
        } else {
            declared.scale.unwrap_or(0)
        };
        if declared.precision != live.precision || scale != live.scale.unwrap_or(0) {
            return Ok(true);
        }
    }
    let declared_base = d.canonical_type_name(&declared.base_type);
    if !d.canonical_type_name(&live.data_type).starts_with(&declared_base) {
        return Ok(true);
    }

    if !column.auto_generated {
        let numeric = column.semantic_type.is_numeric() || date_as_number;
        let default = column.default.as_deref().and_then(normalize_default);
        if !defaults_equal(default.as_deref(), live.default.as_deref(), numeric) {
            return Ok(true);
        }
    }

    if !column.primary_key && !column.auto_generated && column.nullable != live.nullable {
        return Ok(true);
    }

    Ok(d.inline_comments() && comment_changed(column.comment.as_deref(), live.comment.as_deref()))
}

/// Plan the operations that converge `live` onto `declared`.
///
/// `constraints` is the set of constraint names already on the live table;
/// it is consulted case-insensitively.
pub fn diff_table<'a>(
    d: &dyn SchemaDialect,
    declared: &'a TableMeta,
    live: Option<&'a LiveTable>,
    constraints: &HashSet<String>,
) -> Result<Vec<SchemaOperation<'a>>> {
    let mut ops = Vec::new();

    if declared.dropped {
        if live.is_some() {
            tracing::warn!(table = %declared.name, "Dropping live table");
            ops.push(SchemaOperation::DropTable);
        }
        return Ok(ops);
    }

    let Some(live) = live else {
        ops.push(SchemaOperation::CreateTable);
        push_constraints(&mut ops, declared, constraints);
        if !d.inline_comments() {
            if declared.comment.is_some() {
                ops.push(SchemaOperation::TableComment { replacing: false });
            }
            ops.extend(
                declared
                    .active_columns()
                    .filter(|c| c.comment.is_some())
                    .map(|column| SchemaOperation::ColumnComment {
                        column,
                        replacing: false,
                    }),
            );
        }
        return Ok(ops);
    };

    for column in &declared.columns {
        match (live.column(&column.name, declared.sensitivity), column.dropped) {
            (None, false) => {
                ops.push(SchemaOperation::AddColumn(column));
                if column.comment.is_some() && !d.inline_comments() {
                    ops.push(SchemaOperation::ColumnComment {
                        column,
                        replacing: false,
                    });
                }
            }
            (None, true) => {}
            (Some(_), true) => {
                tracing::warn!(
                    table = %declared.name,
                    column = %column.name,
                    "Dropping live column"
                );
                ops.push(SchemaOperation::DropColumn(column));
            }
            (Some(live_column), false) => {
                if column_needs_update(d, column, live_column)
                    .map_err(|e| e.with_table(&declared.name))?
                {
                    ops.push(SchemaOperation::ModifyColumn {
                        column,
                        live: live_column,
                    });
                }
                if !d.inline_comments()
                    && comment_changed(column.comment.as_deref(), live_column.comment.as_deref())
                {
                    ops.push(SchemaOperation::ColumnComment {
                        column,
                        replacing: live_column.comment.is_some(),
                    });
                }
            }
        }
    }

    push_constraints(&mut ops, declared, constraints);

    if comment_changed(declared.comment.as_deref(), live.comment.as_deref()) {
        ops.push(SchemaOperation::TableComment {
            replacing: live.comment.is_some(),
        });
    }

    Ok(ops)
}

fn push_constraints<'a>(
    ops: &mut Vec<SchemaOperation<'a>>,
    declared: &'a TableMeta,
    constraints: &HashSet<String>,
) {
    for unique in declared.unique_constraints() {
        if !has_constraint(constraints, &unique.name) {
            ops.push(SchemaOperation::AddUnique(unique));
        }
    }
    for fk in &declared.foreign_keys {
        if !has_constraint(constraints, &fk.name) {
            ops.push(SchemaOperation::AddForeignKey(fk));
        }
    }
}

/// Diff a declared table against its live snapshot and render the DDL.
///
/// Returns an empty list when the live table already matches.
///
/// # Example
///
/// ```
/// use sqlbridge_core::{ColumnMeta, DatabaseKind, TableMeta};
/// use sqlbridge_schema::{diff_to_ddl, schema_dialect_for};
/// use std::collections::HashSet;
///
/// let users = TableMeta::builder("users")
///     .column(ColumnMeta::integer("id").primary_key())
///     .column(ColumnMeta::varchar("email", 255).not_null())
///     .build()
///     .unwrap();
/// let ddl = diff_to_ddl(
///     schema_dialect_for(DatabaseKind::Postgres),
///     &users,
///     None,
///     &HashSet::new(),
/// )
/// .unwrap();
/// assert_eq!(
///     ddl,
///     ["CREATE TABLE users (id INTEGER NOT NULL, email VARCHAR(255) NOT NULL, PRIMARY KEY (id))"]
/// );
/// ```
pub fn diff_to_ddl(
    d: &dyn SchemaDialect,
    declared: &TableMeta,
    live: Option<&LiveTable>,
    constraints: &HashSet<String>,
) -> Result<Vec<String>> {
    let ops = diff_table(d, declared, live, constraints)?;
    let mut statements = Vec::with_capacity(ops.len());
    for op in &ops {
        let Some(sql) = op.to_sql(d, declared).map_err(|e| e.with_table(&declared.name))? else {
            continue;
        };
        tracing::debug!(
            dialect = d.name(),
            table = %declared.name,
            operation = op.kind(),
            sql = %sql,
            "Planned DDL statement"
        );
        statements.push(sql);
    }
    tracing::debug!(
        dialect = d.name(),
        table = %declared.name,
        statements = statements.len(),
        "Schema diff complete"
    );
    Ok(statements)
}
