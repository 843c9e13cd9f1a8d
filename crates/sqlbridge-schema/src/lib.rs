//! Schema introspection and convergent DDL for SQLBridge.
//!
//! `sqlbridge-schema` compares declared table metadata with what a live
//! database reports and produces the ordered DDL that brings the database in
//! line with the declaration.
//!
//! - [`SchemaDialect`] extends the query dialects with type tables, DDL
//!   fragments and catalog queries for all six databases.
//! - [`Introspector`] reads a [`LiveTable`] snapshot through a borrowed
//!   [`Session`](sqlbridge_core::Session).
//! - [`diff_to_ddl`] is pure: declared table plus snapshot in, statements out.
//!
//! The generator has no transaction semantics; executing the statements is
//! left to the caller.

pub mod ddl;
pub mod dialect;
pub mod diff;
pub mod introspect;
pub mod types;

pub use dialect::{AsSchemaDialect, SchemaDialect, schema_dialect_for, schema_dialect_for_key};
pub use diff::{SchemaOperation, column_needs_update, diff_table, diff_to_ddl};
pub use introspect::{Introspector, LiveColumn, LiveTable};
pub use types::{ParsedSqlType, defaults_equal, normalize_default};
