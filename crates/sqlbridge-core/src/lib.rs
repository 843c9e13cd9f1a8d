//! Core types and traits for SQLBridge.
//!
//! This crate provides the foundational abstractions shared by the query
//! compiler and the schema diff:
//!
//! - `Value` and `Row` for parameters and catalog results
//! - `SemanticType`/`ColumnSubtype`, the database-independent type taxonomy
//! - `TableMeta`/`ColumnMeta`, declared table metadata built once per type
//! - `CaseSensitivity` identifier modes and quoting helpers
//! - `DatabaseKind`, the product selection key
//! - `CompileOptions`, caller-level formatting and decimal defaults
//! - `Session`, the borrowed handle used by introspection
//! - `Outcome` re-export from asupersync for cancel-correct operations

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod config;
pub mod database;
pub mod error;
pub mod identifiers;
pub mod metadata;
pub mod row;
pub mod session;
pub mod types;
pub mod value;

pub use config::{CompileOptions, DecimalDefaults, RoundingMode, TextCase};
pub use database::DatabaseKind;
pub use error::{
    ConfigError, ConstructionError, ConstructionErrorKind, Error, QueryError, Result,
    SchemaError, SchemaErrorKind, TypeError, UnsupportedTypeError,
};
pub use identifiers::{
    CaseSensitivity, NativeCase, identifiers_match, quote_ident, quote_ident_bracket,
    quote_ident_mysql, quote_literal,
};
pub use metadata::{
    ColumnMeta, ForeignKey, ReferentialAction, TableBuilder, TableMeta, UniqueConstraint,
};
pub use row::{FromValue, Row, RowColumns};
pub use session::Session;
pub use types::{ColumnSubtype, SemanticType, is_date_as_number};
pub use value::Value;
