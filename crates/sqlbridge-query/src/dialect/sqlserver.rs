//! Microsoft SQL Server.

use super::Dialect;
use crate::clause::{self, SelectParts};
use crate::column::ColumnOperator;
use crate::context::RenderContext;
use crate::pagination;
use crate::query::Page;
use sqlbridge_core::{DatabaseKind, NativeCase, Result, quote_ident_bracket};

/// SQL Server strategy: bracket quoting, `POWER`-based shifts and
/// `ROW_NUMBER()` paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::SqlServer
    }

    fn native_case(&self) -> NativeCase {
        NativeCase::AsWritten
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_ident_bracket(name)
    }

    fn render_operator_expression(
        &self,
        op: ColumnOperator,
        column: &str,
        operand: Option<i64>,
    ) -> Result<String> {
        match op {
            ColumnOperator::ShiftLeft => {
                let n = clause::require_operand(op, operand)?;
                Ok(format!("({} * POWER(2, {}))", column, n))
            }
            ColumnOperator::ShiftRight => {
                let n = clause::require_operand(op, operand)?;
                Ok(format!("({} / POWER(2, {}))", column, n))
            }
            _ => clause::native_operator(op, column, operand),
        }
    }

    fn paginate(
        &self,
        _ctx: &mut RenderContext<'_>,
        parts: SelectParts,
        page: Page,
    ) -> Result<String> {
        Ok(pagination::row_number(parts, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifts_use_power() {
        let d = SqlServerDialect;
        assert_eq!(
            d.render_operator_expression(ColumnOperator::ShiftLeft, "f", Some(2))
                .unwrap(),
            "(f * POWER(2, 2))"
        );
        assert_eq!(
            d.render_operator_expression(ColumnOperator::ShiftRight, "f", Some(2))
                .unwrap(),
            "(f / POWER(2, 2))"
        );
        assert_eq!(
            d.render_operator_expression(ColumnOperator::BitXor, "f", Some(2))
                .unwrap(),
            "(f ^ 2)"
        );
    }
}
