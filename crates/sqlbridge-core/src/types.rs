//! Semantic type taxonomy.
//!
//! Declared columns and compiled parameters are typed by a [`SemanticType`]
//! plus a [`ColumnSubtype`] refinement. Dialects map the pair onto native
//! column types for DDL; the marshaller uses it to pick a bound representation.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database-independent logical type of a column or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticType {
    String,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    Date,
    Binary,
    Json,
    Uuid,
}

impl SemanticType {
    /// Upper-case name used in diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SemanticType::String => "STRING",
            SemanticType::Boolean => "BOOLEAN",
            SemanticType::Byte => "BYTE",
            SemanticType::Short => "SHORT",
            SemanticType::Integer => "INTEGER",
            SemanticType::Long => "LONG",
            SemanticType::Float => "FLOAT",
            SemanticType::Double => "DOUBLE",
            SemanticType::Decimal => "DECIMAL",
            SemanticType::Date => "DATE",
            SemanticType::Binary => "BINARY",
            SemanticType::Json => "JSON",
            SemanticType::Uuid => "UUID",
        }
    }

    /// Whether values of this type compare numerically.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Byte
                | SemanticType::Short
                | SemanticType::Integer
                | SemanticType::Long
                | SemanticType::Float
                | SemanticType::Double
                | SemanticType::Decimal
        )
    }

    /// Infer the semantic type of a raw value with no declared column behind it.
    pub fn infer(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(SemanticType::Boolean),
            Value::TinyInt(_) => Some(SemanticType::Byte),
            Value::SmallInt(_) => Some(SemanticType::Short),
            Value::Int(_) => Some(SemanticType::Integer),
            Value::BigInt(_) => Some(SemanticType::Long),
            Value::Float(_) => Some(SemanticType::Float),
            Value::Double(_) => Some(SemanticType::Double),
            Value::Decimal(_) => Some(SemanticType::Decimal),
            Value::Text(_) => Some(SemanticType::String),
            Value::Bytes(_) => Some(SemanticType::Binary),
            Value::Date(_) | Value::Time(_) | Value::Timestamp(_) => Some(SemanticType::Date),
            Value::Uuid(_) => Some(SemanticType::Uuid),
            Value::Json(_) => Some(SemanticType::Json),
            Value::Array(items) => items.iter().find_map(Self::infer),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage refinement of a [`SemanticType`].
///
/// String columns use `Char`/`Text`/`Clob`/`Blob`/`Binary`; date columns use
/// `Timestamp`/`DateOnly`/`TimeOnly`/`Year`/`EpochMillis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnSubtype {
    #[default]
    Default,
    Char,
    Text,
    Clob,
    Blob,
    Binary,
    Timestamp,
    DateOnly,
    TimeOnly,
    Year,
    /// Date stored as a number of milliseconds since the epoch
    EpochMillis,
}

impl ColumnSubtype {
    /// Upper-case name used in diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnSubtype::Default => "DEFAULT",
            ColumnSubtype::Char => "CHAR",
            ColumnSubtype::Text => "TEXT",
            ColumnSubtype::Clob => "CLOB",
            ColumnSubtype::Blob => "BLOB",
            ColumnSubtype::Binary => "BINARY",
            ColumnSubtype::Timestamp => "TIMESTAMP",
            ColumnSubtype::DateOnly => "DATE_ONLY",
            ColumnSubtype::TimeOnly => "TIME_ONLY",
            ColumnSubtype::Year => "YEAR",
            ColumnSubtype::EpochMillis => "EPOCH_MILLIS",
        }
    }

    /// Large-object subtypes that need stream or handle binding.
    pub const fn is_lob(&self) -> bool {
        matches!(
            self,
            ColumnSubtype::Clob | ColumnSubtype::Blob | ColumnSubtype::Binary
        )
    }
}

impl fmt::Display for ColumnSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a (type, subtype) pair is a date encoded as a plain number.
pub const fn is_date_as_number(semantic: SemanticType, subtype: ColumnSubtype) -> bool {
    matches!(
        (semantic, subtype),
        (SemanticType::Date, ColumnSubtype::EpochMillis | ColumnSubtype::Year)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_values() {
        assert_eq!(SemanticType::infer(&Value::Null), None);
        assert_eq!(
            SemanticType::infer(&Value::Text("x".into())),
            Some(SemanticType::String)
        );
        assert_eq!(
            SemanticType::infer(&Value::Array(vec![Value::Null, Value::BigInt(3)])),
            Some(SemanticType::Long)
        );
        assert_eq!(
            SemanticType::infer(&Value::Timestamp(0)),
            Some(SemanticType::Date)
        );
    }

    #[test]
    fn test_date_as_number() {
        assert!(is_date_as_number(
            SemanticType::Date,
            ColumnSubtype::EpochMillis
        ));
        assert!(!is_date_as_number(
            SemanticType::Date,
            ColumnSubtype::Timestamp
        ));
        assert!(!is_date_as_number(
            SemanticType::Long,
            ColumnSubtype::EpochMillis
        ));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ColumnSubtype::EpochMillis).unwrap();
        assert_eq!(json, "\"EPOCH_MILLIS\"");
        let ty: SemanticType = serde_json::from_str("\"DECIMAL\"").unwrap();
        assert_eq!(ty, SemanticType::Decimal);
    }
}
