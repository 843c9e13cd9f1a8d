//! Declared table and column metadata.
//!
//! A [`TableMeta`] is the statically validated description of one persistent
//! type: its columns with semantic types, constraints, comments and drop
//! flags. It is built once with [`TableBuilder`] and then treated as plain
//! immutable data by both the query compiler and the schema diff.

use crate::error::{ConstructionError, ConstructionErrorKind, Error, Result};
use crate::identifiers::CaseSensitivity;
use crate::types::{ColumnSubtype, SemanticType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Referential action for foreign key constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// No action - raise error if any references exist.
    #[default]
    NoAction,
    /// Restrict - same as NO ACTION on most databases.
    Restrict,
    /// Cascade - automatically delete/update referencing rows.
    Cascade,
    /// Set null - set referencing columns to NULL.
    SetNull,
    /// Set default - set referencing columns to their default values.
    SetDefault,
}

impl ReferentialAction {
    /// Get the SQL representation of this action.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// Declared metadata for one persistent column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name as declared
    pub name: String,
    /// Logical type
    pub semantic_type: SemanticType,
    /// Storage refinement
    pub subtype: ColumnSubtype,
    /// Character/binary length
    pub length: Option<u32>,
    /// Numeric precision
    pub precision: Option<u32>,
    /// Numeric scale
    pub scale: Option<u32>,
    pub nullable: bool,
    /// Default value as a SQL literal (`0`, `'active'`, `CURRENT_TIMESTAMP`)
    pub default: Option<String>,
    pub primary_key: bool,
    /// Value generated by the database (identity/auto-increment)
    pub auto_generated: bool,
    /// Single-column unique constraint
    pub unique: bool,
    pub comment: Option<String>,
    /// Native type that bypasses the dialect type table
    pub type_override: Option<String>,
    /// Column should be dropped from the live table
    pub dropped: bool,
}

impl ColumnMeta {
    /// Create a nullable column with no constraints.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            subtype: ColumnSubtype::Default,
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            default: None,
            primary_key: false,
            auto_generated: false,
            unique: false,
            comment: None,
            type_override: None,
            dropped: false,
        }
    }

    /// Shorthand for a variable-length string column.
    pub fn varchar(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, SemanticType::String).length(length)
    }

    /// Shorthand for an integer column.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, SemanticType::Integer)
    }

    /// Shorthand for a decimal column.
    pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> Self {
        Self::new(name, SemanticType::Decimal).precision(precision, scale)
    }

    pub fn subtype(mut self, subtype: ColumnSubtype) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set the default value as a SQL literal.
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Mark the column as (part of) the primary key; implies NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Use a native column type instead of the dialect type table.
    pub fn type_override(mut self, native: impl Into<String>) -> Self {
        self.type_override = Some(native.into());
        self
    }

    /// Mark the column for removal from the live table.
    pub fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }
}

/// A named unique constraint over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

/// A named foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    /// Single-column foreign key with no referential actions.
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: vec![column.into()],
            ref_table: ref_table.into(),
            ref_columns: vec![ref_column.into()],
            on_delete: None,
            on_update: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// Declared metadata for one persistent table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub name: String,
    pub comment: Option<String>,
    pub sensitivity: CaseSensitivity,
    pub columns: Vec<ColumnMeta>,
    pub uniques: Vec<UniqueConstraint>,
    pub foreign_keys: Vec<ForeignKey>,
    /// Table should be dropped from the live schema
    pub dropped: bool,
}

impl TableMeta {
    /// Start building a table definition.
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder::new(name)
    }

    /// Look up a declared column by name, honoring the table's casing mode.
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| crate::identifiers::identifiers_match(&c.name, name, self.sensitivity))
    }

    /// Columns that are not marked dropped, in declared order.
    pub fn active_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|c| !c.dropped)
    }

    /// Primary key column names, in declared order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.active_columns()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Table-level unique constraints followed by column-level ones.
    ///
    /// Column-level constraints are named `uk_<table>_<column>`.
    pub fn unique_constraints(&self) -> Vec<UniqueConstraint> {
        let mut all = self.uniques.clone();
        all.extend(self.active_columns().filter(|c| c.unique).map(|c| {
            UniqueConstraint {
                name: format!("uk_{}_{}", self.name, c.name),
                columns: vec![c.name.clone()],
            }
        }));
        all
    }
}

/// Builder for [`TableMeta`]; validation happens in [`TableBuilder::build`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    table: TableMeta,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: TableMeta {
                name: name.into(),
                comment: None,
                sensitivity: CaseSensitivity::Default,
                columns: Vec::new(),
                uniques: Vec::new(),
                foreign_keys: Vec::new(),
                dropped: false,
            },
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.table.comment = Some(comment.into());
        self
    }

    pub fn sensitivity(mut self, sensitivity: CaseSensitivity) -> Self {
        self.table.sensitivity = sensitivity;
        self
    }

    pub fn column(mut self, column: ColumnMeta) -> Self {
        self.table.columns.push(column);
        self
    }

    /// Add a named multi-column unique constraint.
    pub fn unique<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.uniques.push(UniqueConstraint {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.table.foreign_keys.push(fk);
        self
    }

    /// Mark the whole table for removal.
    pub fn dropped(mut self) -> Self {
        self.table.dropped = true;
        self
    }

    /// Validate and produce the table definition.
    pub fn build(self) -> Result<TableMeta> {
        let table = self.table;
        let fail = |kind, message: String, column: Option<&str>| {
            Error::Construction(ConstructionError {
                kind,
                message,
                table: Some(table.name.clone()),
                column: column.map(str::to_string),
            })
        };

        if table.name.trim().is_empty() {
            return Err(fail(
                ConstructionErrorKind::MissingMetadata,
                "table has no name".to_string(),
                None,
            ));
        }
        if table.columns.is_empty() {
            return Err(fail(
                ConstructionErrorKind::MissingMetadata,
                "table declares no columns".to_string(),
                None,
            ));
        }

        let mut seen = HashSet::new();
        for column in &table.columns {
            if column.name.trim().is_empty() {
                return Err(fail(
                    ConstructionErrorKind::EmptyColumn,
                    "column has no name".to_string(),
                    None,
                ));
            }
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(fail(
                    ConstructionErrorKind::MissingMetadata,
                    "column declared twice".to_string(),
                    Some(column.name.as_str()),
                ));
            }
        }

        let constrained = table
            .uniques
            .iter()
            .flat_map(|u| u.columns.iter())
            .chain(table.foreign_keys.iter().flat_map(|fk| fk.columns.iter()));
        for name in constrained {
            if table.column(name).is_none_or(|c| c.dropped) {
                return Err(fail(
                    ConstructionErrorKind::MissingMetadata,
                    "constraint references an undeclared column".to_string(),
                    Some(name.as_str()),
                ));
            }
        }

        for fk in &table.foreign_keys {
            if fk.columns.len() != fk.ref_columns.len() {
                return Err(fail(
                    ConstructionErrorKind::MissingMetadata,
                    format!("foreign key '{}' column count mismatch", fk.name),
                    None,
                ));
            }
        }

        Ok(table)
    }
}
