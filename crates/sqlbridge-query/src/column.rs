//! Column references and projections.

use crate::condition::Condition;
use crate::query::Query;
use serde::{Deserialize, Serialize};
use sqlbridge_core::{ConstructionError, ConstructionErrorKind, Error, Result, Value};

/// Bitwise/arithmetic transform applied to a raw column before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnOperator {
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    ShiftLeft,
    ShiftRight,
    Mod,
    Add,
    Sub,
    Mul,
    Div,
}

impl ColumnOperator {
    /// Native infix symbol, where one exists in ANSI-ish SQL.
    pub const fn symbol(&self) -> &'static str {
        match self {
            ColumnOperator::BitAnd => "&",
            ColumnOperator::BitOr => "|",
            ColumnOperator::BitXor => "^",
            ColumnOperator::BitNot => "~",
            ColumnOperator::ShiftLeft => "<<",
            ColumnOperator::ShiftRight => ">>",
            ColumnOperator::Mod => "%",
            ColumnOperator::Add => "+",
            ColumnOperator::Sub => "-",
            ColumnOperator::Mul => "*",
            ColumnOperator::Div => "/",
        }
    }

    /// Whether the operator takes no right-hand operand.
    pub const fn is_unary(&self) -> bool {
        matches!(self, ColumnOperator::BitNot)
    }
}

/// A reference to a field, optionally qualified, transformed and renamed.
///
/// A column with an alias but no name renders as `alias.*`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    /// Field name
    pub name: Option<String>,
    /// Source table name or alias
    pub alias: Option<String>,
    /// Function wrapped around the column (`COUNT`, `UPPER`, ...)
    pub function: Option<String>,
    /// Transform applied to the raw column
    pub operator: Option<ColumnOperator>,
    /// Integer right-hand side of `operator`
    pub operand: Option<i64>,
    /// Template for the bound value, `{}` marks the placeholder
    pub format: Option<String>,
    /// Output alias
    pub as_name: Option<String>,
}

impl Column {
    /// Unqualified column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Column qualified by a table alias.
    pub fn of(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            alias: Some(alias.into()),
            ..Self::default()
        }
    }

    /// All columns of an aliased table (`alias.*`).
    pub fn all(alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::default()
        }
    }

    /// Set the qualifying table alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Wrap the column in a function call.
    pub fn function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Apply a binary transform, e.g. `flags & 4`.
    pub fn op(mut self, operator: ColumnOperator, operand: i64) -> Self {
        self.operator = Some(operator);
        self.operand = Some(operand);
        self
    }

    /// Apply a unary transform, e.g. `~flags`.
    pub fn unary(mut self, operator: ColumnOperator) -> Self {
        self.operator = Some(operator);
        self.operand = None;
        self
    }

    /// Render bound values through a template, e.g. `TO_DATE({}, 'YYYY-MM-DD')`.
    pub fn format(mut self, template: impl Into<String>) -> Self {
        self.format = Some(template.into());
        self
    }

    /// Set the output alias.
    pub fn as_name(mut self, as_name: impl Into<String>) -> Self {
        self.as_name = Some(as_name.into());
        self
    }

    /// Whether the raw column value is used unchanged.
    pub fn is_plain(&self) -> bool {
        self.function.is_none() && self.operator.is_none()
    }

    /// Name of this column in a result set.
    pub fn output_name(&self) -> String {
        match (&self.as_name, &self.name) {
            (Some(as_name), _) => as_name.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => "*".to_string(),
        }
    }

    /// Reject columns that reference nothing.
    pub fn validate(&self) -> Result<()> {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|s| s.trim().is_empty());
        if blank(&self.name) && blank(&self.alias) {
            return Err(Error::Construction(ConstructionError {
                kind: ConstructionErrorKind::EmptyColumn,
                message: "column has neither name nor alias".to_string(),
                table: None,
                column: self.as_name.clone(),
            }));
        }
        if let Some(op) = self.operator {
            if !op.is_unary() && self.operand.is_none() {
                return Err(Error::Construction(ConstructionError {
                    kind: ConstructionErrorKind::InvalidQuery,
                    message: format!("operator '{}' needs an operand", op.symbol()),
                    table: None,
                    column: self.name.clone(),
                }));
            }
        }
        Ok(())
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::new(name)
    }
}

/// A `CASE WHEN ... END` projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseColumn {
    /// Ordered `WHEN condition THEN value` branches
    pub branches: Vec<(Condition, Value)>,
    /// `ELSE` value
    pub else_value: Option<Value>,
    /// Output alias
    pub as_name: Option<String>,
}

impl CaseColumn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `WHEN condition THEN value` branch.
    pub fn when(mut self, condition: Condition, value: impl Into<Value>) -> Self {
        self.branches.push((condition, value.into()));
        self
    }

    /// Set the `ELSE` value.
    pub fn otherwise(mut self, value: impl Into<Value>) -> Self {
        self.else_value = Some(value.into());
        self
    }

    pub fn as_name(mut self, as_name: impl Into<String>) -> Self {
        self.as_name = Some(as_name.into());
        self
    }
}

/// One item of a select list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Column(Column),
    Case(CaseColumn),
    /// Scalar subquery with its output alias
    Query { query: Box<Query>, as_name: String },
}

impl Projection {
    /// Name of this projection in a result set.
    pub fn output_name(&self) -> String {
        match self {
            Projection::Column(c) => c.output_name(),
            Projection::Case(c) => c.as_name.clone().unwrap_or_else(|| "case".to_string()),
            Projection::Query { as_name, .. } => as_name.clone(),
        }
    }
}

impl From<Column> for Projection {
    fn from(column: Column) -> Self {
        Projection::Column(column)
    }
}

impl From<&str> for Projection {
    fn from(name: &str) -> Self {
        Projection::Column(Column::new(name))
    }
}

impl From<CaseColumn> for Projection {
    fn from(case: CaseColumn) -> Self {
        Projection::Case(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_column_is_invalid() {
        let err = Column::default().validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Construction(ConstructionError {
                kind: ConstructionErrorKind::EmptyColumn,
                ..
            })
        ));
        assert!(Column::new("  ").validate().is_err());
    }

    #[test]
    fn test_alias_only_column_is_valid() {
        let col = Column::all("u");
        assert!(col.validate().is_ok());
        assert_eq!(col.output_name(), "*");
    }

    #[test]
    fn test_binary_operator_needs_operand() {
        let mut col = Column::new("flags");
        col.operator = Some(ColumnOperator::BitAnd);
        assert!(col.validate().is_err());
        assert!(Column::new("flags").unary(ColumnOperator::BitNot).validate().is_ok());
    }

    #[test]
    fn test_output_names() {
        assert_eq!(Column::new("id").output_name(), "id");
        assert_eq!(Column::new("id").as_name("user_id").output_name(), "user_id");
        assert_eq!(
            Projection::from(CaseColumn::new().as_name("tier")).output_name(),
            "tier"
        );
    }
}
