//! Oracle.

use super::Dialect;
use crate::bind::{BoundValue, LobKind};
use crate::clause::{self, SelectParts};
use crate::column::ColumnOperator;
use crate::context::{BindParam, RenderContext};
use crate::pagination;
use crate::query::Page;
use sqlbridge_core::{ColumnSubtype, DatabaseKind, NativeCase, Result, SemanticType, Value};

/// Oracle strategy.
///
/// Oracle has only `BITAND`, so the other bitwise operators are built from
/// it arithmetically: OR is `x + y - BITAND(x, y)` and XOR is
/// `x + y - 2 * BITAND(x, y)`. Paging goes through `ROWNUM` and needs every
/// column qualified, and `''` is NULL.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl Dialect for OracleDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Oracle
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
        let x = column;
        Ok(match op {
            ColumnOperator::BitNot => format!("(-1 - {})", x),
            ColumnOperator::BitAnd => {
                format!("BITAND({}, {})", x, clause::require_operand(op, operand)?)
            }
            ColumnOperator::BitOr => {
                let n = clause::require_operand(op, operand)?;
                format!("({0} + {1} - BITAND({0}, {1}))", x, n)
            }
            ColumnOperator::BitXor => {
                let n = clause::require_operand(op, operand)?;
                format!("({0} + {1} - 2 * BITAND({0}, {1}))", x, n)
            }
            ColumnOperator::ShiftLeft => {
                let n = clause::require_operand(op, operand)?;
                format!("({} * POWER(2, {}))", x, n)
            }
            ColumnOperator::ShiftRight => {
                let n = clause::require_operand(op, operand)?;
                format!("FLOOR({} / POWER(2, {}))", x, n)
            }
            ColumnOperator::Mod => {
                format!("MOD({}, {})", x, clause::require_operand(op, operand)?)
            }
            _ => return clause::native_operator(op, column, operand),
        })
    }

    fn empty_string_is_null(&self) -> bool {
        true
    }

    fn requires_paging_alias(&self) -> bool {
        true
    }

    fn paginate(
        &self,
        ctx: &mut RenderContext<'_>,
        parts: SelectParts,
        page: Page,
    ) -> Result<String> {
        Ok(pagination::rownum(ctx, parts, page))
    }

    fn pre_bind(&self, param: &BindParam) -> Result<Option<BoundValue>> {
        match param.semantic_type {
            Some(SemanticType::Double) => {
                let Some(v) = param.value.as_f64() else {
                    return Ok(None);
                };
                tracing::trace!(column = ?param.column, "Binding DOUBLE as BINARY_DOUBLE");
                Ok(Some(BoundValue::NativeDouble(v)))
            }
            Some(SemanticType::String | SemanticType::Binary) => Ok(native_lob(param)),
            _ => Ok(None),
        }
    }
}

/// Build a native CLOB/BLOB handle for a large-object column.
pub(crate) fn native_lob(param: &BindParam) -> Option<BoundValue> {
    let (kind, native_type) = match param.subtype {
        ColumnSubtype::Clob => (LobKind::Clob, "CLOB"),
        ColumnSubtype::Blob => (LobKind::Blob, "BLOB"),
        _ => return None,
    };
    let data = match &param.value {
        Value::Text(text) => text.clone().into_bytes(),
        Value::Bytes(bytes) => bytes.clone(),
        other => other.to_string().into_bytes(),
    };
    tracing::trace!(column = ?param.column, native_type, "Creating LOB handle");
    Some(BoundValue::Lob {
        kind,
        native_type,
        data,
    })
}
