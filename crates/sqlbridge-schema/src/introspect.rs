//! Live schema snapshots.
//!
//! Introspection borrows a caller-owned [`Session`] for the duration of one
//! call and reads the catalog through the dialect's catalog queries. The
//! session is never stored, so acquisition and release stay with the caller
//! on every exit path, cancellation included.

use crate::dialect::SchemaDialect;
use crate::types::normalize_default;
use serde::{Deserialize, Serialize};
use sqlbridge_core::{
    CaseSensitivity, Cx, Error, Outcome, Result, Row, SchemaError, SchemaErrorKind, Session,
    Value, identifiers_match,
};
use std::collections::HashSet;

/// One column as reported by the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveColumn {
    /// Column name as stored in the catalog
    pub name: String,
    /// Catalog type name, unparsed (`character varying`, `NUMBER`, `nvarchar`)
    pub data_type: String,
    /// Declared character length; absent for unbounded types
    pub char_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
    /// Default value, normalized with [`normalize_default`]
    pub default: Option<String>,
    pub primary_key: bool,
    /// Identity or auto-increment column
    pub auto_generated: bool,
    /// 1-based position in the table
    pub ordinal: u32,
    pub comment: Option<String>,
}

impl LiveColumn {
    /// A nullable column with only a name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            char_length: None,
            precision: None,
            scale: None,
            nullable: true,
            default: None,
            primary_key: false,
            auto_generated: false,
            ordinal: 0,
            comment: None,
        }
    }

    /// Read a row of a dialect's columns query.
    #[allow(clippy::result_large_err)]
    pub fn from_row(row: &Row) -> Result<Self> {
        let count = |name: &str| -> Result<Option<u32>> {
            Ok(row
                .get_opt::<i64>(name)?
                .and_then(|v| u32::try_from(v).ok()))
        };
        let name: String = row
            .get_named("column_name")
            .map_err(|e| malformed(e, None))?;
        let read = || -> Result<Self> {
            Ok(Self {
                data_type: row.get_named("data_type")?,
                char_length: count("char_length")?,
                precision: count("num_precision")?,
                scale: count("num_scale")?,
                nullable: row.get_opt::<bool>("is_nullable")?.unwrap_or(true),
                default: row
                    .get_opt::<String>("column_default")?
                    .as_deref()
                    .and_then(normalize_default),
                primary_key: row.get_opt::<bool>("is_pk")?.unwrap_or(false),
                auto_generated: row.get_opt::<bool>("is_identity")?.unwrap_or(false),
                ordinal: count("ordinal")?.unwrap_or(0),
                comment: non_blank(row.get_opt::<String>("column_comment")?),
                name: name.clone(),
            })
        };
        read().map_err(|e| malformed(e, Some(&name)))
    }
}

/// A live table with its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveTable {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<LiveColumn>,
}

impl LiveTable {
    /// Find the live counterpart of a declared column name.
    pub fn column(&self, declared: &str, sensitivity: CaseSensitivity) -> Option<&LiveColumn> {
        self.columns
            .iter()
            .find(|c| identifiers_match(declared, &c.name, sensitivity))
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|s| !s.trim().is_empty())
}

fn malformed(err: Error, column: Option<&str>) -> Error {
    let message = match column {
        Some(column) => format!("unreadable catalog row for column '{}': {}", column, err),
        None => format!("unreadable catalog row: {}", err),
    };
    Error::Schema(SchemaError {
        kind: SchemaErrorKind::MalformedCatalog,
        message,
        source: Some(Box::new(err)),
    })
}

/// Reads live table structure through a borrowed session.
#[derive(Debug, Clone, Copy)]
pub struct Introspector<'d> {
    dialect: &'d dyn SchemaDialect,
}

impl<'d> Introspector<'d> {
    pub fn new(dialect: &'d dyn SchemaDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &'d dyn SchemaDialect {
        self.dialect
    }

    async fn catalog_rows<S: Session>(
        &self,
        cx: &Cx,
        session: &S,
        sql: &str,
        name: &str,
        sensitivity: CaseSensitivity,
    ) -> Outcome<Vec<Row>, Error> {
        let catalog_name = sensitivity.catalog_name(name, self.dialect.native_case());
        tracing::trace!(
            dialect = self.dialect.name(),
            table = %catalog_name,
            sql = sql,
            "Reading catalog"
        );
        session.query(cx, sql, &[Value::Text(catalog_name)]).await
    }

    /// Whether the table exists in the session's current schema.
    pub async fn table_exists<S: Session>(
        &self,
        cx: &Cx,
        session: &S,
        name: &str,
        sensitivity: CaseSensitivity,
    ) -> Outcome<bool, Error> {
        let sql = self.dialect.table_sql();
        match self.catalog_rows(cx, session, sql, name, sensitivity).await {
            Outcome::Ok(rows) => Outcome::Ok(!rows.is_empty()),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Column snapshot of one table, in ordinal order.
    ///
    /// An absent table yields an empty list.
    pub async fn introspect_columns<S: Session>(
        &self,
        cx: &Cx,
        session: &S,
        name: &str,
        sensitivity: CaseSensitivity,
    ) -> Outcome<Vec<LiveColumn>, Error> {
        let sql = self.dialect.columns_sql();
        let rows = match self.catalog_rows(cx, session, sql, name, sensitivity).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let parsed: Result<Vec<_>> = rows.iter().map(LiveColumn::from_row).collect();
        let mut columns = match parsed {
            Ok(columns) => columns,
            Err(e) => return Outcome::Err(e),
        };
        columns.sort_by_key(|c| c.ordinal);
        Outcome::Ok(columns)
    }

    /// Table name, comment and columns, or `None` when the table is absent.
    pub async fn introspect_table<S: Session>(
        &self,
        cx: &Cx,
        session: &S,
        name: &str,
        sensitivity: CaseSensitivity,
    ) -> Outcome<Option<LiveTable>, Error> {
        let sql = self.dialect.table_sql();
        let rows = match self.catalog_rows(cx, session, sql, name, sensitivity).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        let Some(row) = rows.first() else {
            tracing::debug!(dialect = self.dialect.name(), table = name, "Table not found");
            return Outcome::Ok(None);
        };

        let header = row
            .get_named::<String>("table_name")
            .and_then(|table_name| {
                Ok((table_name, non_blank(row.get_opt::<String>("table_comment")?)))
            });
        let (table_name, comment) = match header {
            Ok(header) => header,
            Err(e) => return Outcome::Err(malformed(e, None)),
        };

        let columns = match self.introspect_columns(cx, session, name, sensitivity).await {
            Outcome::Ok(columns) => columns,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        tracing::debug!(
            dialect = self.dialect.name(),
            table = %table_name,
            columns = columns.len(),
            "Introspected table"
        );
        Outcome::Ok(Some(LiveTable {
            name: table_name,
            comment,
            columns,
        }))
    }

    /// Like [`introspect_table`](Self::introspect_table), but an absent
    /// table is a `TableNotFound` schema error.
    pub async fn require_table<S: Session>(
        &self,
        cx: &Cx,
        session: &S,
        name: &str,
        sensitivity: CaseSensitivity,
    ) -> Outcome<LiveTable, Error> {
        match self.introspect_table(cx, session, name, sensitivity).await {
            Outcome::Ok(Some(table)) => Outcome::Ok(table),
            Outcome::Ok(None) => Outcome::Err(Error::Schema(SchemaError {
                kind: SchemaErrorKind::TableNotFound,
                message: format!("table '{}' does not exist", name),
                source: None,
            })),
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Names of every constraint currently on the table.
    pub async fn constraint_names<S: Session>(
        &self,
        cx: &Cx,
        session: &S,
        name: &str,
        sensitivity: CaseSensitivity,
    ) -> Outcome<HashSet<String>, Error> {
        let sql = self.dialect.constraints_sql();
        let rows = match self.catalog_rows(cx, session, sql, name, sensitivity).await {
            Outcome::Ok(rows) => rows,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let names = rows
            .iter()
            .filter_map(|row| row.get_opt::<String>("constraint_name").ok().flatten())
            .collect();
        Outcome::Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::schema_dialect_for;
    use asupersync::runtime::RuntimeBuilder;
    use sqlbridge_core::DatabaseKind;
    use std::sync::Mutex;

    /// Answers catalog queries from canned rows, keyed by a SQL fragment.
    struct ScriptedSession {
        answers: Vec<(&'static str, Vec<Row>)>,
        seen: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl ScriptedSession {
        fn new(answers: Vec<(&'static str, Vec<Row>)>) -> Self {
            Self {
                answers,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Session for ScriptedSession {
        fn query(
            &self,
            _cx: &Cx,
            sql: &str,
            params: &[Value],
        ) -> impl Future<Output = Outcome<Vec<Row>, Error>> + Send {
            self.seen
                .lock()
                .unwrap()
                .push((sql.to_string(), params.to_vec()));
            let rows = self
                .answers
                .iter()
                .find(|(key, _)| sql.contains(key))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default();
            async move { Outcome::Ok(rows) }
        }
    }

    fn column_row(values: Vec<Value>) -> Row {
        Row::new(
            [
                "COLUMN_NAME",
                "DATA_TYPE",
                "CHAR_LENGTH",
                "NUM_PRECISION",
                "NUM_SCALE",
                "IS_NULLABLE",
                "COLUMN_DEFAULT",
                "IS_PK",
                "IS_IDENTITY",
                "ORDINAL",
                "COLUMN_COMMENT",
            ]
            .map(String::from)
            .to_vec(),
            values,
        )
    }

    fn oracle_session() -> ScriptedSession {
        ScriptedSession::new(vec![
            (
                "USER_TAB_COLUMNS",
                vec![
                    column_row(vec![
                        Value::Text("EMAIL".into()),
                        Value::Text("VARCHAR2".into()),
                        Value::BigInt(255),
                        Value::Null,
                        Value::Null,
                        Value::Text("N".into()),
                        Value::Text("'none' \n".into()),
                        Value::Int(0),
                        Value::Int(0),
                        Value::Int(2),
                        Value::Null,
                    ]),
                    column_row(vec![
                        Value::Text("ID".into()),
                        Value::Text("NUMBER".into()),
                        Value::BigInt(22),
                        Value::BigInt(10),
                        Value::BigInt(0),
                        Value::Text("N".into()),
                        Value::Null,
                        Value::Int(1),
                        Value::Int(1),
                        Value::Int(1),
                        Value::Text("surrogate".into()),
                    ]),
                ],
            ),
            (
                "USER_TABLES",
                vec![Row::new(
                    vec!["TABLE_NAME".into(), "TABLE_COMMENT".into()],
                    vec![Value::Text("USERS".into()), Value::Null],
                )],
            ),
            (
                "USER_CONSTRAINTS WHERE",
                vec![
                    Row::new(
                        vec!["CONSTRAINT_NAME".into()],
                        vec![Value::Text("SYS_C0012".into())],
                    ),
                    Row::new(
                        vec!["CONSTRAINT_NAME".into()],
                        vec![Value::Text("UK_USERS_EMAIL".into())],
                    ),
                ],
            ),
        ])
    }

    #[test]
    fn test_introspect_table_reads_columns() {
        let rt = RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let session = oracle_session();
        let introspector = Introspector::new(schema_dialect_for(DatabaseKind::Oracle));

        rt.block_on(async {
            let outcome = introspector
                .introspect_table(&cx, &session, "users", CaseSensitivity::Default)
                .await;
            let Outcome::Ok(Some(table)) = outcome else {
                panic!("expected a live table");
            };
            assert_eq!(table.name, "USERS");
            assert_eq!(table.comment, None);
            assert_eq!(table.columns.len(), 2);

            let id = &table.columns[0];
            assert_eq!(id.name, "ID");
            assert_eq!((id.precision, id.scale), (Some(10), Some(0)));
            assert!(id.primary_key && id.auto_generated && !id.nullable);
            assert_eq!(id.comment.as_deref(), Some("surrogate"));

            let email = table.column("email", CaseSensitivity::Default).unwrap();
            assert_eq!(email.char_length, Some(255));
            assert_eq!(email.default.as_deref(), Some("none"));
            assert!(table.column("email", CaseSensitivity::Restrict).is_none());
        });

        let seen = session.seen.lock().unwrap();
        assert!(
            seen.iter()
                .all(|(_, params)| params == &vec![Value::Text("USERS".into())])
        );
    }

    #[test]
    fn test_absent_table() {
        let rt = RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let session = ScriptedSession::new(Vec::new());
        let introspector = Introspector::new(schema_dialect_for(DatabaseKind::Postgres));

        rt.block_on(async {
            let exists = introspector
                .table_exists(&cx, &session, "Users", CaseSensitivity::Default)
                .await;
            assert!(matches!(exists, Outcome::Ok(false)));
            let table = introspector
                .introspect_table(&cx, &session, "Users", CaseSensitivity::Default)
                .await;
            assert!(matches!(table, Outcome::Ok(None)));
        });

        let seen = session.seen.lock().unwrap();
        assert_eq!(seen[0].1, vec![Value::Text("users".into())]);
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_require_table_reports_missing_table() {
        let rt = RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let introspector = Introspector::new(schema_dialect_for(DatabaseKind::Oracle));

        rt.block_on(async {
            let empty = ScriptedSession::new(Vec::new());
            let outcome = introspector
                .require_table(&cx, &empty, "audit_log", CaseSensitivity::Default)
                .await;
            let Outcome::Err(Error::Schema(err)) = outcome else {
                panic!("expected a schema error");
            };
            assert_eq!(err.kind, SchemaErrorKind::TableNotFound);
            assert!(err.message.contains("audit_log"), "{}", err.message);

            let outcome = introspector
                .require_table(&cx, &oracle_session(), "users", CaseSensitivity::Default)
                .await;
            assert!(matches!(outcome, Outcome::Ok(ref t) if t.columns.len() == 2));
        });
    }

    #[test]
    fn test_constraint_names() {
        let rt = RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        let cx = Cx::for_testing();
        let session = oracle_session();
        let introspector = Introspector::new(schema_dialect_for(DatabaseKind::Oracle));

        rt.block_on(async {
            let Outcome::Ok(names) = introspector
                .constraint_names(&cx, &session, "users", CaseSensitivity::Default)
                .await
            else {
                panic!("expected constraint names");
            };
            assert!(names.contains("UK_USERS_EMAIL"));
            assert_eq!(names.len(), 2);
        });
    }

    #[test]
    fn test_malformed_row() {
        let row = Row::new(vec!["DATA_TYPE".into()], vec![Value::Text("INT".into())]);
        let err = LiveColumn::from_row(&row).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::MalformedCatalog,
                ..
            })
        ));
    }

    #[test]
    fn test_sqlserver_unbounded_length_reads_as_absent() {
        let row = column_row(vec![
            Value::Text("body".into()),
            Value::Text("nvarchar".into()),
            Value::Int(-1),
            Value::Null,
            Value::Null,
            Value::Text("YES".into()),
            Value::Text("((0))".into()),
            Value::Int(0),
            Value::Int(0),
            Value::Int(3),
            Value::Text(String::new()),
        ]);
        let column = LiveColumn::from_row(&row).unwrap();
        assert_eq!(column.char_length, None);
        assert_eq!(column.default.as_deref(), Some("0"));
        assert!(column.nullable);
        assert_eq!(column.comment, None);
    }
}
