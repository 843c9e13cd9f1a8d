//! SQLBridge - one query model, six SQL dialects.
//!
//! SQLBridge compiles a database-independent query description into
//! parameterized SQL for MySQL, PostgreSQL, Oracle, SQL Server, H2 and DB2,
//! and keeps declared tables and live schemas in step:
//!
//! - Query AST (`Query`, `Condition`, `Expression`, `Column`, `Join`, `Order`)
//! - Per-database `Dialect` strategies with pagination emulation
//! - A parameter `Marshaller` that prepares values for each driver
//! - Schema introspection and convergent DDL through `SchemaDialect`
//!
//! The library never opens connections. Introspection borrows a caller-owned
//! [`Session`] for the duration of one call.
//!
//! # Quick Start
//!
//! ```
//! use sqlbridge::prelude::*;
//!
//! let query = Query::table("users")
//!     .column("id")
//!     .column("email")
//!     .and(Expression::eq("status", "active"))
//!     .asc("id");
//!
//! let compiled = sqlbridge::dialect("mysql")
//!     .unwrap()
//!     .compile_select(&query, Some(Page::new(0, 10)), &CompileOptions::default())
//!     .unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT id, email FROM users WHERE status = ? ORDER BY id ASC LIMIT ? OFFSET ?"
//! );
//! assert_eq!(
//!     compiled.values(),
//!     vec![Value::Text("active".into()), Value::BigInt(10), Value::BigInt(0)]
//! );
//! ```
//!
//! # Schema convergence
//!
//! ```rust,ignore
//! let users = TableMeta::builder("users")
//!     .column(ColumnMeta::integer("id").primary_key())
//!     .column(ColumnMeta::varchar("email", 255).not_null())
//!     .build()?;
//!
//! let statements = plan_migration(&cx, &session, sqlbridge::dialect("oracle")?, &users).await;
//! ```

pub mod migrate;

pub use sqlbridge_core::{
    // Configuration
    CompileOptions,
    // Errors
    ConfigError,
    ConstructionError,
    ConstructionErrorKind,
    // asupersync re-exports
    Cx,
    DatabaseKind,
    DecimalDefaults,
    Error,
    Outcome,
    QueryError,
    Result,
    RoundingMode,
    SchemaError,
    SchemaErrorKind,
    TextCase,
    TypeError,
    UnsupportedTypeError,
    // Values and rows
    FromValue,
    Row,
    Session,
    Value,
    // Metadata and types
    CaseSensitivity,
    ColumnMeta,
    ColumnSubtype,
    ForeignKey,
    NativeCase,
    ReferentialAction,
    SemanticType,
    TableBuilder,
    TableMeta,
    UniqueConstraint,
    quote_literal,
};
pub use sqlbridge_query::{
    BindParam, BoundValue, CaseColumn, Clause, Column, ColumnOperator, Combinator,
    CompiledQuery, Condition, DecimalRounding, Dialect, Direction, Expression, Join, JoinKind,
    LobKind, Marshaller, Operator, Order, Page, Projection, Query, ResultShape, TableRef,
    bind_all, compile_count, compile_select, dialect_for, resolve_aliases,
};
pub use sqlbridge_schema::{
    Introspector, LiveColumn, LiveTable, SchemaDialect, SchemaOperation, diff_table, diff_to_ddl,
    schema_dialect_for,
};

pub use migrate::{plan_migration, plan_migrations};

/// Look up a dialect by its selection key (`mysql`, `postgresql`, `oracle`,
/// `sqlserver`, `h2`, `db2` and their aliases).
///
/// The returned dialect both compiles queries and generates DDL.
pub fn dialect(key: &str) -> Result<&'static dyn SchemaDialect> {
    sqlbridge_schema::schema_dialect_for_key(key)
}

/// Prelude module for convenient imports.
///
/// ```
/// use sqlbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Metadata
        CaseSensitivity,
        ColumnMeta,
        // Query building
        Column,
        CompileOptions,
        Condition,
        Cx,
        DatabaseKind,
        // Strategies
        Dialect,
        Error,
        Expression,
        Join,
        Order,
        Outcome,
        Page,
        Query,
        Result,
        Row,
        SchemaDialect,
        SemanticType,
        Session,
        TableMeta,
        Value,
        // Functions
        bind_all,
        plan_migration,
    };
}
