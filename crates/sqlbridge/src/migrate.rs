//! Migration planning over a borrowed session.
//!
//! Introspection and diffing are separate steps in `sqlbridge-schema`; this
//! module strings them together for the common case of "bring this declared
//! table up to date". The returned statements are not executed.

use sqlbridge_core::{Cx, Error, Outcome, Session, TableMeta};
use sqlbridge_schema::{Introspector, SchemaDialect, diff_to_ddl};
use std::collections::HashSet;

/// Plan the DDL that converges the live table onto `table`.
///
/// Reads the live snapshot through `session`, then diffs. Constraint names
/// are only read when the table already exists. An empty result means the
/// live table already matches the declaration.
///
/// # Example
///
/// ```rust,ignore
/// let statements = plan_migration(&cx, &session, dialect("postgresql")?, &users).await;
/// ```
pub async fn plan_migration<S: Session>(
    cx: &Cx,
    session: &S,
    dialect: &dyn SchemaDialect,
    table: &TableMeta,
) -> Outcome<Vec<String>, Error> {
    let introspector = Introspector::new(dialect);
    let live = match introspector
        .introspect_table(cx, session, &table.name, table.sensitivity)
        .await
    {
        Outcome::Ok(live) => live,
        Outcome::Err(e) => return Outcome::Err(e),
        Outcome::Cancelled(r) => return Outcome::Cancelled(r),
        Outcome::Panicked(p) => return Outcome::Panicked(p),
    };

    let constraints = if live.is_some() {
        match introspector
            .constraint_names(cx, session, &table.name, table.sensitivity)
            .await
        {
            Outcome::Ok(names) => names,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
    } else {
        HashSet::new()
    };

    tracing::debug!(
        dialect = dialect.name(),
        table = %table.name,
        exists = live.is_some(),
        constraints = constraints.len(),
        "Planning migration"
    );

    match diff_to_ddl(dialect, table, live.as_ref(), &constraints) {
        Ok(statements) => Outcome::Ok(statements),
        Err(e) => Outcome::Err(e),
    }
}

/// Plan several tables in order, concatenating their statements.
///
/// Stops at the first table that fails.
pub async fn plan_migrations<S: Session>(
    cx: &Cx,
    session: &S,
    dialect: &dyn SchemaDialect,
    tables: &[TableMeta],
) -> Outcome<Vec<String>, Error> {
    let mut statements = Vec::new();
    for table in tables {
        match plan_migration(cx, session, dialect, table).await {
            Outcome::Ok(mut planned) => statements.append(&mut planned),
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
    }
    Outcome::Ok(statements)
}
