//! PostgreSQL.

use super::Dialect;
use crate::bind::BoundValue;
use crate::clause;
use crate::column::ColumnOperator;
use crate::context::BindParam;
use sqlbridge_core::{ColumnSubtype, DatabaseKind, NativeCase, Result, SemanticType, Value};

/// PostgreSQL strategy: `#` for XOR, lower-case catalog, `text`/`bytea`
/// for large objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    fn native_case(&self) -> NativeCase {
        NativeCase::Lower
    }

    fn render_operator_expression(
        &self,
        op: ColumnOperator,
        column: &str,
        operand: Option<i64>,
    ) -> Result<String> {
        match op {
            ColumnOperator::BitXor => {
                let n = clause::require_operand(op, operand)?;
                Ok(format!("({} # {})", column, n))
            }
            _ => clause::native_operator(op, column, operand),
        }
    }

    fn pre_bind(&self, param: &BindParam) -> Result<Option<BoundValue>> {
        if param.semantic_type != Some(SemanticType::String) {
            return Ok(None);
        }
        let bound = match (param.subtype, &param.value) {
            (ColumnSubtype::Clob, Value::Text(text)) => BoundValue::Text(text.clone()),
            (ColumnSubtype::Blob, Value::Bytes(bytes)) => BoundValue::BinaryStream(bytes.clone()),
            (ColumnSubtype::Blob, Value::Text(text)) => {
                BoundValue::BinaryStream(text.clone().into_bytes())
            }
            _ => return Ok(None),
        };
        tracing::trace!(subtype = %param.subtype, "PostgreSQL large object bound inline");
        Ok(Some(bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_uses_hash() {
        let d = PostgresDialect;
        assert_eq!(
            d.render_operator_expression(ColumnOperator::BitXor, "f", Some(1))
                .unwrap(),
            "(f # 1)"
        );
        assert_eq!(
            d.render_operator_expression(ColumnOperator::BitAnd, "f", Some(1))
                .unwrap(),
            "(f & 1)"
        );
    }

    #[test]
    fn test_lobs_bind_inline() {
        let d = PostgresDialect;
        let clob = BindParam::typed(Value::from("long"), SemanticType::String, ColumnSubtype::Clob);
        assert_eq!(d.pre_bind(&clob).unwrap(), Some(BoundValue::Text("long".into())));
        let blob = BindParam::typed(
            Value::Bytes(vec![1, 2]),
            SemanticType::String,
            ColumnSubtype::Blob,
        );
        assert_eq!(
            d.pre_bind(&blob).unwrap(),
            Some(BoundValue::BinaryStream(vec![1, 2]))
        );
        let plain = BindParam::inferred(Value::from("x"));
        assert_eq!(d.pre_bind(&plain).unwrap(), None);
    }
}
