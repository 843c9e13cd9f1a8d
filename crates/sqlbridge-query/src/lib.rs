//! Dialect-abstracted SQL compiler for SQLBridge.
//!
//! `sqlbridge-query` is the **query compilation layer**. It turns an in-memory
//! query AST into dialect-correct parameterized SQL plus an ordered list of
//! typed parameters, and marshals those parameters into driver-ready values.
//!
//! # Role In The Architecture
//!
//! - **AST**: `Column`, `Expression`, `Condition`, `Order`, `Join`, `Query`.
//! - **Dialect strategies**: one `Dialect` per database, selected by key.
//! - **Compiler**: `compile_select`/`compile_count` with pagination emulation.
//! - **Marshaller**: `Marshaller` converts `BindParam`s into `BoundValue`s.
//!
//! # Example
//!
//! ```
//! use sqlbridge_query::{Expression, Page, Query, dialect_for};
//! use sqlbridge_core::{CompileOptions, DatabaseKind};
//!
//! let query = Query::table("users")
//!     .column("id")
//!     .and(Expression::in_list("email", ["a@x.com", "b@x.com"]));
//! let compiled = dialect_for(DatabaseKind::Mysql)
//!     .compile_select(&query, Some(Page::new(10, 20)), &CompileOptions::default())
//!     .unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT id FROM users WHERE email IN (?,?) LIMIT ? OFFSET ?"
//! );
//! ```

pub mod alias;
pub mod bind;
pub mod clause;
pub mod column;
pub mod compiler;
pub mod condition;
pub mod context;
pub mod dialect;
pub mod expr;
pub mod join;
pub mod pagination;
pub mod query;

pub use alias::resolve_aliases;
pub use bind::{BoundValue, DecimalRounding, LobKind, Marshaller, bind_all, rounding_strategy};
pub use clause::{Direction, Order, SelectParts};
pub use column::{CaseColumn, Column, ColumnOperator, Projection};
pub use compiler::{
    CompiledQuery, PAGING_ALIAS, ProjectionMode, ResultShape, build_parts, compile_count,
    compile_select, fold_case,
};
pub use condition::{Clause, Combinator, Condition, ConditionEntry, render_conditions};
pub use context::{BindParam, RenderContext};
pub use dialect::{
    AsDialect, Db2Dialect, Dialect, H2Dialect, MysqlDialect, OracleDialect, PostgresDialect,
    SqlServerDialect, dialect_for, dialect_for_key,
};
pub use expr::{Expression, Operand, Operator};
pub use join::{Join, JoinKind, JoinTarget};
pub use query::{AliasedTable, FromClause, Page, Query, TableRef, TableSource};
