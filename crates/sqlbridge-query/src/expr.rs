//! Single predicates.
//!
//! An [`Expression`] compares a left column against a value, a value list,
//! another column or a nested query. Expressions whose comparison operand
//! is NULL render to nothing rather than to an always-unknown predicate, so
//! callers can build filters from optional inputs without pre-validating.

use crate::column::Column;
use crate::context::RenderContext;
use crate::query::Query;
use serde::{Deserialize, Serialize};
use sqlbridge_core::{ConstructionError, ConstructionErrorKind, Error, Result, Value};

/// Predicate operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
    /// `LIKE 'value%'`
    StartsWith,
    /// `LIKE '%value'`
    EndsWith,
    /// `LIKE '%value%'`
    Contains,
    Between,
    NotBetween,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    /// NULL or empty string
    IsEmpty,
    /// Neither NULL nor empty string
    IsNotEmpty,
    Exists,
    NotExists,
}

impl Operator {
    /// Null-test kinds need no value.
    pub const fn is_null_test(&self) -> bool {
        matches!(
            self,
            Operator::IsNull | Operator::IsNotNull | Operator::IsEmpty | Operator::IsNotEmpty
        )
    }

    pub const fn is_exists(&self) -> bool {
        matches!(self, Operator::Exists | Operator::NotExists)
    }

    const fn comparison_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::NotLike => "NOT LIKE",
            _ => "LIKE",
        }
    }
}

/// Right-hand side of an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Operand {
    /// No value given
    #[default]
    None,
    /// A value (lists for IN/NOT IN are `Value::Array`)
    Value(Value),
    /// Another column, for column-to-column comparisons
    Column(Column),
    /// A nested query
    Query(Box<Query>),
}

impl Operand {
    fn is_missing(&self) -> bool {
        matches!(self, Operand::None | Operand::Value(Value::Null))
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<Column> for Operand {
    fn from(column: Column) -> Self {
        Operand::Column(column)
    }
}

/// A single predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// Left column; absent only for EXISTS/NOT EXISTS
    pub left: Option<Column>,
    pub operator: Operator,
    pub value: Operand,
    /// Upper bound for BETWEEN/NOT BETWEEN
    pub and_value: Operand,
}

impl Expression {
    /// Build an expression comparing `left` with a value.
    pub fn new(left: impl Into<Column>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            left: Some(left.into()),
            operator,
            value: Operand::Value(value.into()),
            and_value: Operand::None,
        }
    }

    pub fn eq(left: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::new(left, Operator::Eq, value)
    }

    pub fn ne(left: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::new(left, Operator::Ne, value)
    }

    pub fn gt(left: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::new(left, Operator::Gt, value)
    }

    pub fn ge(left: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::new(left, Operator::Ge, value)
    }

    pub fn lt(left: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::new(left, Operator::Lt, value)
    }

    pub fn le(left: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::new(left, Operator::Le, value)
    }

    pub fn like(left: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        Self::new(left, Operator::Like, pattern)
    }

    pub fn contains(left: impl Into<Column>, text: impl Into<Value>) -> Self {
        Self::new(left, Operator::Contains, text)
    }

    pub fn starts_with(left: impl Into<Column>, text: impl Into<Value>) -> Self {
        Self::new(left, Operator::StartsWith, text)
    }

    pub fn ends_with(left: impl Into<Column>, text: impl Into<Value>) -> Self {
        Self::new(left, Operator::EndsWith, text)
    }

    pub fn between(
        left: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self {
            left: Some(left.into()),
            operator: Operator::Between,
            value: Operand::Value(low.into()),
            and_value: Operand::Value(high.into()),
        }
    }

    pub fn not_between(
        left: impl Into<Column>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self {
            operator: Operator::NotBetween,
            ..Self::between(left, low, high)
        }
    }

    /// `left IN (...)` over a list of values.
    pub fn in_list<I, V>(left: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = values.into_iter().map(Into::into).collect();
        Self::new(left, Operator::In, Value::Array(items))
    }

    /// `left NOT IN (...)` over a list of values.
    pub fn not_in_list<I, V>(left: impl Into<Column>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = values.into_iter().map(Into::into).collect();
        Self::new(left, Operator::NotIn, Value::Array(items))
    }

    /// `left IN (subquery)`.
    pub fn in_query(left: impl Into<Column>, query: Query) -> Self {
        Self {
            left: Some(left.into()),
            operator: Operator::In,
            value: Operand::Query(Box::new(query)),
            and_value: Operand::None,
        }
    }

    pub fn is_null(left: impl Into<Column>) -> Self {
        Self::test(left, Operator::IsNull)
    }

    pub fn is_not_null(left: impl Into<Column>) -> Self {
        Self::test(left, Operator::IsNotNull)
    }

    pub fn is_empty(left: impl Into<Column>) -> Self {
        Self::test(left, Operator::IsEmpty)
    }

    pub fn is_not_empty(left: impl Into<Column>) -> Self {
        Self::test(left, Operator::IsNotEmpty)
    }

    fn test(left: impl Into<Column>, operator: Operator) -> Self {
        Self {
            left: Some(left.into()),
            operator,
            value: Operand::None,
            and_value: Operand::None,
        }
    }

    /// Compare two columns, e.g. a join condition `o.user_id = u.id`.
    pub fn columns(left: impl Into<Column>, operator: Operator, right: Column) -> Self {
        Self {
            left: Some(left.into()),
            operator,
            value: Operand::Column(right),
            and_value: Operand::None,
        }
    }

    /// `EXISTS (subquery)`.
    pub fn exists(query: Query) -> Self {
        Self {
            left: None,
            operator: Operator::Exists,
            value: Operand::Query(Box::new(query)),
            and_value: Operand::None,
        }
    }

    /// `NOT EXISTS (subquery)`.
    pub fn not_exists(query: Query) -> Self {
        Self {
            operator: Operator::NotExists,
            ..Self::exists(query)
        }
    }

    fn construction(&self, kind: ConstructionErrorKind, message: &str) -> Error {
        Error::Construction(ConstructionError {
            kind,
            message: message.to_string(),
            table: None,
            column: self.left.as_ref().and_then(|c| c.name.clone()),
        })
    }

    /// Render this predicate, or `None` when it contributes no predicate.
    ///
    /// Parameters are pushed into `ctx` in placeholder order.
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Result<Option<String>> {
        if self.operator.is_exists() {
            let Operand::Query(query) = &self.value else {
                return Err(self.construction(
                    ConstructionErrorKind::InvalidExists,
                    "EXISTS needs a nested query",
                ));
            };
            if self.left.is_some() {
                return Err(self.construction(
                    ConstructionErrorKind::InvalidExists,
                    "EXISTS takes no left column",
                ));
            }
            let keyword = if self.operator == Operator::Exists {
                "EXISTS"
            } else {
                "NOT EXISTS"
            };
            let sub = ctx.subquery(query)?;
            return Ok(Some(format!("{} ({})", keyword, sub)));
        }

        let Some(left) = &self.left else {
            return Err(self.construction(
                ConstructionErrorKind::MissingLeft,
                "expression has no left column",
            ));
        };
        let column = ctx.column(left)?;

        if self.operator.is_null_test() {
            let empty_is_null = ctx.dialect().empty_string_is_null();
            let sql = match self.operator {
                Operator::IsNull => format!("{} IS NULL", column),
                Operator::IsNotNull => format!("{} IS NOT NULL", column),
                Operator::IsEmpty if empty_is_null => format!("{} IS NULL", column),
                Operator::IsNotEmpty if empty_is_null => format!("{} IS NOT NULL", column),
                Operator::IsEmpty => format!("({0} IS NULL OR {0} = '')", column),
                _ => format!("({0} IS NOT NULL AND {0} <> '')", column),
            };
            return Ok(Some(sql));
        }

        if self.value.is_missing() {
            return Ok(None);
        }

        match self.operator {
            Operator::In | Operator::NotIn => self.render_in(ctx, left, column),
            Operator::Between | Operator::NotBetween => {
                if self.and_value.is_missing() {
                    return Ok(None);
                }
                let keyword = if self.operator == Operator::Between {
                    "BETWEEN"
                } else {
                    "NOT BETWEEN"
                };
                let low = self.operand_sql(ctx, left, &self.value)?;
                let high = self.operand_sql(ctx, left, &self.and_value)?;
                Ok(Some(format!("{} {} {} AND {}", column, keyword, low, high)))
            }
            Operator::StartsWith | Operator::EndsWith | Operator::Contains => {
                let pattern = match &self.value {
                    Operand::Value(v) => {
                        let text = v.as_str().map_or_else(|| v.to_string(), str::to_string);
                        Operand::Value(Value::Text(match self.operator {
                            Operator::StartsWith => format!("{}%", text),
                            Operator::EndsWith => format!("%{}", text),
                            _ => format!("%{}%", text),
                        }))
                    }
                    other => other.clone(),
                };
                let rhs = self.operand_sql(ctx, left, &pattern)?;
                Ok(Some(format!("{} LIKE {}", column, rhs)))
            }
            op => {
                let rhs = self.operand_sql(ctx, left, &self.value)?;
                Ok(Some(format!("{} {} {}", column, op.comparison_sql(), rhs)))
            }
        }
    }

    fn render_in(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Column,
        column: String,
    ) -> Result<Option<String>> {
        let keyword = if self.operator == Operator::In {
            "IN"
        } else {
            "NOT IN"
        };
        match &self.value {
            Operand::Value(list) => {
                let items = list.non_null_items();
                if items.is_empty() {
                    tracing::trace!(column = %column, "IN list empty after trimming nulls; skipped");
                    return Ok(None);
                }
                let placeholders: Vec<String> = items
                    .into_iter()
                    .map(|item| ctx.bind_value(Some(left), item))
                    .collect();
                Ok(Some(format!(
                    "{} {} ({})",
                    column,
                    keyword,
                    placeholders.join(",")
                )))
            }
            Operand::Query(query) => {
                let sub = ctx.subquery(query)?;
                Ok(Some(format!("{} {} ({})", column, keyword, sub)))
            }
            Operand::Column(other) => {
                let rhs = ctx.column(other)?;
                Ok(Some(format!("{} {} ({})", column, keyword, rhs)))
            }
            Operand::None => Ok(None),
        }
    }

    fn operand_sql(
        &self,
        ctx: &mut RenderContext<'_>,
        left: &Column,
        operand: &Operand,
    ) -> Result<String> {
        match operand {
            Operand::Value(v) => Ok(ctx.bind_value(Some(left), v.clone())),
            Operand::Column(c) => ctx.column(c),
            Operand::Query(q) => Ok(format!("({})", ctx.subquery(q)?)),
            Operand::None => Err(self.construction(
                ConstructionErrorKind::InvalidQuery,
                "expression operand missing",
            )),
        }
    }
}
