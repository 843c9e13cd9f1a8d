//! Error types for SQLBridge operations.

use std::fmt;

/// The primary error type for all SQLBridge operations.
#[derive(Debug)]
pub enum Error {
    /// A query or table definition is structurally invalid
    Construction(ConstructionError),
    /// A declared type has no mapping in the active dialect
    UnsupportedType(UnsupportedTypeError),
    /// Value conversion errors
    Type(TypeError),
    /// Errors reported by the borrowed session
    Query(QueryError),
    /// Schema introspection errors
    Schema(SchemaError),
    /// Configuration errors
    Config(ConfigError),
    /// Operation was cancelled via asupersync
    Cancelled,
}

#[derive(Debug)]
pub struct ConstructionError {
    pub kind: ConstructionErrorKind,
    pub message: String,
    pub table: Option<String>,
    pub column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionErrorKind {
    /// Column with neither a name nor an alias
    EmptyColumn,
    /// Expression without a left-hand column
    MissingLeft,
    /// EXISTS/NOT EXISTS with a left column or without a nested query
    InvalidExists,
    /// Table with no declared columns
    MissingMetadata,
    /// Any other malformed query shape
    InvalidQuery,
}

#[derive(Debug)]
pub struct UnsupportedTypeError {
    pub dialect: &'static str,
    pub semantic_type: String,
    pub subtype: String,
    pub table: Option<String>,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct QueryError {
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// A table the caller requires is absent from the catalog
    TableNotFound,
    /// A catalog row could not be interpreted
    MalformedCatalog,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Build a construction error without table/column context.
    pub fn construction(kind: ConstructionErrorKind, message: impl Into<String>) -> Self {
        Error::Construction(ConstructionError {
            kind,
            message: message.into(),
            table: None,
            column: None,
        })
    }

    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            message: message.into(),
            source: None,
        })
    }

    /// Is this a fatal construction error?
    pub fn is_construction(&self) -> bool {
        matches!(self, Error::Construction(_))
    }

    /// Is this an unsupported-type error?
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, Error::UnsupportedType(_))
    }

    /// The table this error was raised for, if known.
    pub fn table(&self) -> Option<&str> {
        match self {
            Error::Construction(e) => e.table.as_deref(),
            Error::UnsupportedType(e) => e.table.as_deref(),
            _ => None,
        }
    }

    /// The column this error was raised for, if known.
    pub fn column(&self) -> Option<&str> {
        match self {
            Error::Construction(e) => e.column.as_deref(),
            Error::UnsupportedType(e) => e.column.as_deref(),
            Error::Type(e) => e.column.as_deref(),
            _ => None,
        }
    }

    /// Attach table context to errors that carry it.
    pub fn with_table(mut self, table: &str) -> Self {
        match &mut self {
            Error::Construction(e) if e.table.is_none() => e.table = Some(table.to_string()),
            Error::UnsupportedType(e) if e.table.is_none() => e.table = Some(table.to_string()),
            _ => {}
        }
        self
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl ConstructionError {
    /// Attach the offending column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Construction(e) => write!(f, "Construction error: {}", e),
            Error::UnsupportedType(e) => write!(f, "Unsupported type: {}", e),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Schema(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        match (&self.table, &self.column) {
            (Some(t), Some(c)) => write!(f, " (column '{}.{}')", t, c),
            (Some(t), None) => write!(f, " (table '{}')", t),
            (None, Some(c)) => write!(f, " (column '{}')", c),
            (None, None) => Ok(()),
        }
    }
}

impl fmt::Display for UnsupportedTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has no column type for {}/{}",
            self.dialect, self.semantic_type, self.subtype
        )?;
        match (&self.table, &self.column) {
            (Some(t), Some(c)) => write!(f, " (column '{}.{}')", t, c),
            (None, Some(c)) => write!(f, " (column '{}')", c),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ConstructionError> for Error {
    fn from(err: ConstructionError) -> Self {
        Error::Construction(err)
    }
}

impl From<UnsupportedTypeError> for Error {
    fn from(err: UnsupportedTypeError) -> Self {
        Error::UnsupportedType(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(ConfigError {
            message: format!("invalid options document: {}", err),
            source: Some(Box::new(err)),
        })
    }
}

/// Result type alias for SQLBridge operations.
pub type Result<T> = std::result::Result<T, Error>;
