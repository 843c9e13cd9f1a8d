//! H2.

use super::{Dialect, MysqlDialect};
use crate::clause::{self, SelectParts};
use crate::column::ColumnOperator;
use crate::context::RenderContext;
use crate::query::Page;
use sqlbridge_core::{DatabaseKind, NativeCase, Result};

/// H2 strategy: bit functions instead of operators, upper-case catalog,
/// and MySQL-style paging.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Dialect;

impl Dialect for H2Dialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::H2
    }

    fn native_case(&self) -> NativeCase {
        NativeCase::Upper
    }

    fn render_operator_expression(
        &self,
        op: ColumnOperator,
        column: &str,
        operand: Option<i64>,
    ) -> Result<String> {
        let function = match op {
            ColumnOperator::BitNot => return Ok(format!("BITNOT({})", column)),
            ColumnOperator::BitAnd => "BITAND",
            ColumnOperator::BitOr => "BITOR",
            ColumnOperator::BitXor => "BITXOR",
            ColumnOperator::ShiftLeft => "LSHIFT",
            ColumnOperator::ShiftRight => "RSHIFT",
            ColumnOperator::Mod => "MOD",
            _ => return clause::native_operator(op, column, operand),
        };
        let n = clause::require_operand(op, operand)?;
        Ok(format!("{}({}, {})", function, column, n))
    }

    fn paginate(
        &self,
        ctx: &mut RenderContext<'_>,
        parts: SelectParts,
        page: Page,
    ) -> Result<String> {
        MysqlDialect.paginate(ctx, parts, page)
    }
}
