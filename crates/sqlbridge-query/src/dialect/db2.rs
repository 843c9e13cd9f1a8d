//! IBM Db2.

use super::Dialect;
use super::oracle::native_lob;
use crate::bind::BoundValue;
use crate::clause::{self, SelectParts};
use crate::column::ColumnOperator;
use crate::context::{BindParam, RenderContext};
use crate::pagination;
use crate::query::Page;
use sqlbridge_core::{DatabaseKind, NativeCase, Result, SemanticType};

/// Db2 strategy: bit functions, `POWER`-based shifts, `OFFSET/FETCH`
/// paging and native LOB handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2Dialect;

impl Dialect for Db2Dialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Db2
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
            ColumnOperator::ShiftLeft => {
                let n = clause::require_operand(op, operand)?;
                return Ok(format!("({} * POWER(2, {}))", column, n));
            }
            ColumnOperator::ShiftRight => {
                let n = clause::require_operand(op, operand)?;
                return Ok(format!("({} / POWER(2, {}))", column, n));
            }
            ColumnOperator::BitAnd => "BITAND",
            ColumnOperator::BitOr => "BITOR",
            ColumnOperator::BitXor => "BITXOR",
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
        Ok(pagination::offset_fetch(ctx, &parts, page))
    }

    fn pre_bind(&self, param: &BindParam) -> Result<Option<BoundValue>> {
        match param.semantic_type {
            Some(SemanticType::String | SemanticType::Binary) => Ok(native_lob(param)),
            _ => Ok(None),
        }
    }
}
