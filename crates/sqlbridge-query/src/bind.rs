//! Parameter marshalling.
//!
//! Converts each [`BindParam`] into the [`BoundValue`] a driver binds.
//! Order of decisions for one parameter:
//!
//! 1. NULL binds as NULL.
//! 2. An empty STRING binds as NULL when `empty_string_as_null` is set.
//! 3. The dialect's [`Dialect::pre_bind`] may take the value.
//! 4. Generic dispatch by semantic type, then subtype.
//!
//! DECIMAL scale and rounding resolve by priority: per-call rounding, then
//! the declared column scale (with the global mode), then the global
//! defaults.

use crate::compiler::CompiledQuery;
use crate::context::BindParam;
use crate::dialect::Dialect;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlbridge_core::{
    ColumnSubtype, CompileOptions, Error, Result, RoundingMode, SemanticType, TypeError, Value,
};
use std::str::FromStr;

/// Large-object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    Clob,
    Blob,
}

/// A driver-ready parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    /// IEEE double bound through the database's native binary type
    NativeDouble(f64),
    Decimal(Decimal),
    Text(String),
    /// Text streamed as a character stream
    CharacterStream(String),
    /// Bytes streamed as a binary stream
    BinaryStream(Vec<u8>),
    /// Dialect-native large-object handle, populated with `data`
    Lob {
        kind: LobKind,
        native_type: &'static str,
        data: Vec<u8>,
    },
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    Year(i32),
    Json(String),
    Uuid(String),
}

/// Per-call DECIMAL override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalRounding {
    pub scale: u32,
    pub mode: RoundingMode,
}

impl DecimalRounding {
    pub const fn new(scale: u32, mode: RoundingMode) -> Self {
        Self { scale, mode }
    }
}

/// Map a configured rounding mode onto `rust_decimal`'s strategies.
pub const fn rounding_strategy(mode: RoundingMode) -> RoundingStrategy {
    match mode {
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
        RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        RoundingMode::Up => RoundingStrategy::AwayFromZero,
        RoundingMode::Down => RoundingStrategy::ToZero,
        RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
        RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
    }
}

/// Marshals parameters for one dialect under one set of options.
#[derive(Debug, Clone, Copy)]
pub struct Marshaller<'a> {
    dialect: &'a dyn Dialect,
    options: &'a CompileOptions,
}

impl<'a> Marshaller<'a> {
    pub fn new(dialect: &'a dyn Dialect, options: &'a CompileOptions) -> Self {
        Self { dialect, options }
    }

    /// Bind one parameter with the configured DECIMAL defaults.
    pub fn bind(&self, param: &BindParam) -> Result<BoundValue> {
        self.bind_with(param, None)
    }

    /// Bind one parameter, with an optional per-call DECIMAL override.
    pub fn bind_with(
        &self,
        param: &BindParam,
        rounding: Option<DecimalRounding>,
    ) -> Result<BoundValue> {
        if param.value.is_null() {
            return Ok(BoundValue::Null);
        }
        let Some(semantic) = param
            .semantic_type
            .or_else(|| SemanticType::infer(&param.value))
        else {
            return Ok(BoundValue::Null);
        };

        if semantic == SemanticType::String
            && self.options.empty_string_as_null
            && param.value.as_str() == Some("")
        {
            tracing::trace!(column = ?param.column, "Empty string bound as NULL");
            return Ok(BoundValue::Null);
        }

        let resolved;
        let param = if param.semantic_type.is_some() {
            param
        } else {
            resolved = BindParam {
                semantic_type: Some(semantic),
                ..param.clone()
            };
            &resolved
        };
        if let Some(bound) = self.dialect.pre_bind(param)? {
            tracing::trace!(
                dialect = self.dialect.name(),
                column = ?param.column,
                "Parameter taken by dialect pre-bind"
            );
            return Ok(bound);
        }

        match semantic {
            SemanticType::String => Ok(bind_string(param)),
            SemanticType::Binary => Ok(BoundValue::BinaryStream(to_bytes(&param.value))),
            SemanticType::Boolean => param
                .value
                .as_bool()
                .map(BoundValue::Bool)
                .ok_or_else(|| mismatch("BOOLEAN", param)),
            SemanticType::Byte
            | SemanticType::Short
            | SemanticType::Integer
            | SemanticType::Long => integer(&param.value)
                .map(BoundValue::Int)
                .ok_or_else(|| mismatch("INTEGER", param)),
            SemanticType::Float | SemanticType::Double => float(&param.value)
                .map(BoundValue::Double)
                .ok_or_else(|| mismatch("DOUBLE", param)),
            SemanticType::Decimal => self.bind_decimal(param, rounding),
            SemanticType::Date => bind_date(param),
            SemanticType::Json => Ok(BoundValue::Json(match &param.value {
                Value::Json(json) => json.to_string(),
                other => other.as_str().map_or_else(|| other.to_string(), str::to_string),
            })),
            SemanticType::Uuid => Ok(BoundValue::Uuid(param.value.to_string())),
        }
    }

    /// Bind every parameter of a compiled query, in order.
    pub fn bind_all(&self, compiled: &CompiledQuery) -> Result<Vec<BoundValue>> {
        compiled.params.iter().map(|p| self.bind(p)).collect()
    }

    fn bind_decimal(
        &self,
        param: &BindParam,
        rounding: Option<DecimalRounding>,
    ) -> Result<BoundValue> {
        let value = decimal(&param.value).ok_or_else(|| mismatch("DECIMAL", param))?;
        let (scale, mode) = match (rounding, param.scale) {
            (Some(call), _) => (call.scale, call.mode),
            (None, Some(scale)) => (scale, self.options.decimal.rounding),
            (None, None) => (self.options.decimal.scale, self.options.decimal.rounding),
        };
        tracing::trace!(column = ?param.column, scale, mode = ?mode, "Rounding DECIMAL");
        Ok(BoundValue::Decimal(
            value.round_dp_with_strategy(scale, rounding_strategy(mode)),
        ))
    }
}

/// Bind every parameter of `compiled` for `dialect`.
pub fn bind_all(
    compiled: &CompiledQuery,
    dialect: &dyn Dialect,
    options: &CompileOptions,
) -> Result<Vec<BoundValue>> {
    Marshaller::new(dialect, options).bind_all(compiled)
}

fn mismatch(expected: &'static str, param: &BindParam) -> Error {
    Error::Type(TypeError {
        expected,
        actual: format!("{} '{}'", param.value.type_name(), param.value),
        column: param.column.clone(),
    })
}

fn bind_string(param: &BindParam) -> BoundValue {
    match param.subtype {
        ColumnSubtype::Clob => BoundValue::CharacterStream(to_text(&param.value)),
        ColumnSubtype::Blob | ColumnSubtype::Binary => {
            BoundValue::BinaryStream(to_bytes(&param.value))
        }
        _ => BoundValue::Text(to_text(&param.value)),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        other => other.to_string(),
    }
}

fn to_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Bytes(b) => b.clone(),
        Value::Text(s) => s.clone().into_bytes(),
        other => other.to_string().into_bytes(),
    }
}

fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| match value {
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn float(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| match value {
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(s) | Value::Text(s) => Decimal::from_str(s.trim()).ok(),
        Value::Float(f) => Decimal::try_from(f64::from(*f)).ok(),
        Value::Double(f) => Decimal::try_from(*f).ok(),
        other => other.as_i64().map(Decimal::from),
    }
}

/// A DATE input before subtype conversion.
enum Moment {
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn moment(value: &Value) -> Option<Moment> {
    match value {
        Value::Timestamp(us) => {
            DateTime::from_timestamp_micros(*us).map(|dt| Moment::DateTime(dt.naive_utc()))
        }
        Value::Date(days) => NaiveDate::from_num_days_from_ce_opt(days.checked_add(719_163)?)
            .map(|d| Moment::DateTime(d.and_time(NaiveTime::MIN))),
        Value::Time(us) => {
            let secs = u32::try_from(us.div_euclid(1_000_000)).ok()?;
            let nanos = u32::try_from(us.rem_euclid(1_000_000) * 1_000).ok()?;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).map(Moment::Time)
        }
        Value::Text(s) => parse_moment(s.trim()),
        other => other
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| Moment::DateTime(dt.naive_utc())),
    }
}

fn parse_moment(text: &str) -> Option<Moment> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Moment::DateTime(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Moment::DateTime(date.and_time(NaiveTime::MIN)));
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .ok()
        .map(Moment::Time)
}

fn bind_date(param: &BindParam) -> Result<BoundValue> {
    if param.subtype == ColumnSubtype::Year {
        if let Some(year) = integer(&param.value).and_then(|y| i32::try_from(y).ok()) {
            if (0..=9999).contains(&year) {
                return Ok(BoundValue::Year(year));
            }
        }
    }
    let moment = moment(&param.value).ok_or_else(|| mismatch("DATE", param))?;
    let bound = match (param.subtype, moment) {
        (ColumnSubtype::TimeOnly, Moment::Time(t)) => BoundValue::Time(t),
        (ColumnSubtype::TimeOnly, Moment::DateTime(dt)) => BoundValue::Time(dt.time()),
        (_, Moment::Time(_)) => return Err(mismatch("DATE", param)),
        (ColumnSubtype::EpochMillis, Moment::DateTime(dt)) => {
            BoundValue::EpochMillis(dt.and_utc().timestamp_millis())
        }
        (ColumnSubtype::DateOnly, Moment::DateTime(dt)) => BoundValue::Date(dt.date()),
        (ColumnSubtype::Year, Moment::DateTime(dt)) => BoundValue::Year(dt.year()),
        (_, Moment::DateTime(dt)) => BoundValue::Timestamp(dt),
    };
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Db2Dialect, Dialect, MysqlDialect, OracleDialect, PostgresDialect};
    use crate::expr::Expression;
    use crate::query::Query;
    use sqlbridge_core::{ColumnMeta, TableMeta};
    use std::sync::Arc;

    fn typed(value: impl Into<Value>, semantic: SemanticType, subtype: ColumnSubtype) -> BindParam {
        BindParam::typed(value.into(), semantic, subtype)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_null_binds_null() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&OracleDialect, &options);
        let p = typed(Value::Null, SemanticType::String, ColumnSubtype::Clob);
        assert_eq!(m.bind(&p).unwrap(), BoundValue::Null);
        assert_eq!(m.bind(&BindParam::inferred(Value::Null)).unwrap(), BoundValue::Null);
    }

    #[test]
    fn test_empty_string_normalizes_to_null() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&MysqlDialect, &options);
        let p = typed("", SemanticType::String, ColumnSubtype::Default);
        assert_eq!(m.bind(&p).unwrap(), BoundValue::Null);

        let keep = CompileOptions::default().empty_string_as_null(false);
        let m = Marshaller::new(&MysqlDialect, &keep);
        assert_eq!(m.bind(&p).unwrap(), BoundValue::Text(String::new()));
    }

    #[test]
    fn test_string_subtypes() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&MysqlDialect, &options);
        assert_eq!(
            m.bind(&typed("x", SemanticType::String, ColumnSubtype::Default)).unwrap(),
            BoundValue::Text("x".into())
        );
        assert_eq!(
            m.bind(&typed("x", SemanticType::String, ColumnSubtype::Clob)).unwrap(),
            BoundValue::CharacterStream("x".into())
        );
        assert_eq!(
            m.bind(&typed("x", SemanticType::String, ColumnSubtype::Blob)).unwrap(),
            BoundValue::BinaryStream(b"x".to_vec())
        );
        assert_eq!(
            m.bind(&typed(42, SemanticType::String, ColumnSubtype::Default)).unwrap(),
            BoundValue::Text("42".into())
        );
    }

    #[test]
    fn test_binary_from_text_and_bytes() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&MysqlDialect, &options);
        assert_eq!(
            m.bind(&typed(vec![1u8, 2], SemanticType::Binary, ColumnSubtype::Default)).unwrap(),
            BoundValue::BinaryStream(vec![1, 2])
        );
        assert_eq!(
            m.bind(&typed("ab", SemanticType::Binary, ColumnSubtype::Default)).unwrap(),
            BoundValue::BinaryStream(b"ab".to_vec())
        );
    }

    #[test]
    fn test_pre_bind_takes_precedence() {
        let options = CompileOptions::default();
        let clob = typed("text", SemanticType::String, ColumnSubtype::Clob);
        assert!(matches!(
            Marshaller::new(&OracleDialect, &options).bind(&clob).unwrap(),
            BoundValue::Lob { kind: LobKind::Clob, .. }
        ));
        assert!(matches!(
            Marshaller::new(&Db2Dialect, &options).bind(&clob).unwrap(),
            BoundValue::Lob { kind: LobKind::Clob, .. }
        ));
        assert_eq!(
            Marshaller::new(&PostgresDialect, &options).bind(&clob).unwrap(),
            BoundValue::Text("text".into())
        );
        assert_eq!(
            Marshaller::new(&MysqlDialect, &options).bind(&clob).unwrap(),
            BoundValue::CharacterStream("text".into())
        );

        let double = BindParam::inferred(Value::Double(2.5));
        assert_eq!(
            Marshaller::new(&OracleDialect, &options).bind(&double).unwrap(),
            BoundValue::NativeDouble(2.5)
        );
        assert_eq!(
            Marshaller::new(&MysqlDialect, &options).bind(&double).unwrap(),
            BoundValue::Double(2.5)
        );
    }

    #[test]
    fn test_decimal_priority() {
        let options = CompileOptions::default().decimal_scale(3);
        let m = Marshaller::new(&MysqlDialect, &options);

        // global default
        let p = typed(Value::Decimal("1.23456".into()), SemanticType::Decimal, ColumnSubtype::Default);
        assert_eq!(m.bind(&p).unwrap(), BoundValue::Decimal(dec("1.235")));

        // column scale beats global
        let mut col = p.clone();
        col.scale = Some(1);
        assert_eq!(m.bind(&col).unwrap(), BoundValue::Decimal(dec("1.2")));

        // per-call beats column
        let call = DecimalRounding::new(4, RoundingMode::Down);
        assert_eq!(
            m.bind_with(&col, Some(call)).unwrap(),
            BoundValue::Decimal(dec("1.2345"))
        );
    }

    #[test]
    fn test_rounding_modes() {
        let options = CompileOptions::default().decimal_scale(0);
        let cases = [
            (RoundingMode::HalfUp, "2.5", "3"),
            (RoundingMode::HalfDown, "2.5", "2"),
            (RoundingMode::HalfEven, "2.5", "2"),
            (RoundingMode::HalfEven, "3.5", "4"),
            (RoundingMode::Up, "2.1", "3"),
            (RoundingMode::Down, "2.9", "2"),
            (RoundingMode::Ceiling, "-2.9", "-2"),
            (RoundingMode::Floor, "-2.1", "-3"),
        ];
        for (mode, input, expected) in cases {
            let options = options.clone().rounding(mode);
            let m = Marshaller::new(&MysqlDialect, &options);
            let p = typed(input, SemanticType::Decimal, ColumnSubtype::Default);
            assert_eq!(
                m.bind(&p).unwrap(),
                BoundValue::Decimal(dec(expected)),
                "{:?} {}",
                mode,
                input
            );
        }
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&MysqlDialect, &options);
        let mut p = typed("abc", SemanticType::Decimal, ColumnSubtype::Default);
        p.column = Some("price".into());
        let err = m.bind(&p).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
        assert_eq!(err.column(), Some("price"));
    }

    #[test]
    fn test_date_subtypes() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&MysqlDialect, &options);
        let dt = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let micros = dt.and_utc().timestamp_micros();
        let value = Value::Timestamp(micros);

        let bind = |subtype| m.bind(&typed(value.clone(), SemanticType::Date, subtype)).unwrap();
        assert_eq!(bind(ColumnSubtype::Default), BoundValue::Timestamp(dt));
        assert_eq!(bind(ColumnSubtype::Timestamp), BoundValue::Timestamp(dt));
        assert_eq!(bind(ColumnSubtype::DateOnly), BoundValue::Date(dt.date()));
        assert_eq!(bind(ColumnSubtype::TimeOnly), BoundValue::Time(dt.time()));
        assert_eq!(bind(ColumnSubtype::Year), BoundValue::Year(2024));
        assert_eq!(
            bind(ColumnSubtype::EpochMillis),
            BoundValue::EpochMillis(dt.and_utc().timestamp_millis())
        );
    }

    #[test]
    fn test_date_inputs() {
        let options = CompileOptions::default();
        let m = Marshaller::new(&MysqlDialect, &options);
        let day = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(
            m.bind(&typed(Value::Date(1), SemanticType::Date, ColumnSubtype::DateOnly)).unwrap(),
            BoundValue::Date(day)
        );
        assert_eq!(
            m.bind(&typed("1970-01-02", SemanticType::Date, ColumnSubtype::DateOnly)).unwrap(),
            BoundValue::Date(day)
        );
        assert_eq!(
            m.bind(&typed(86_400_000i64, SemanticType::Date, ColumnSubtype::DateOnly)).unwrap(),
            BoundValue::Date(day)
        );
        assert_eq!(
            m.bind(&typed(1999, SemanticType::Date, ColumnSubtype::Year)).unwrap(),
            BoundValue::Year(1999)
        );
        assert_eq!(
            m.bind(&typed("12:34:56", SemanticType::Date, ColumnSubtype::TimeOnly)).unwrap(),
            BoundValue::Time(NaiveTime::from_hms_opt(12, 34, 56).unwrap())
        );
        assert!(m
            .bind(&typed("12:34:56", SemanticType::Date, ColumnSubtype::DateOnly))
            .is_err());
        assert!(m
            .bind(&typed("not a date", SemanticType::Date, ColumnSubtype::Default))
            .is_err());
    }

    #[test]
    fn test_bind_all_follows_compiled_metadata() {
        let meta = Arc::new(
            TableMeta::builder("accounts")
                .column(ColumnMeta::integer("id").primary_key())
                .column(ColumnMeta::decimal("balance", 12, 2))
                .build()
                .unwrap(),
        );
        let q = Query::table(meta)
            .and(Expression::gt("balance", Value::Decimal("10.005".into())))
            .and(Expression::eq("id", 7));
        let options = CompileOptions::default();
        let compiled = MysqlDialect.compile_select(&q, None, &options).unwrap();
        let bound = bind_all(&compiled, &MysqlDialect, &options).unwrap();
        assert_eq!(bound[0], BoundValue::Decimal(dec("10.01")));
        assert_eq!(bound[1], BoundValue::Int(7));
    }
}
