//! Database product selection.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported database products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// MySQL / MariaDB
    Mysql,
    /// PostgreSQL
    Postgres,
    /// Oracle Database
    Oracle,
    /// Microsoft SQL Server
    SqlServer,
    /// H2
    H2,
    /// IBM Db2
    Db2,
}

impl DatabaseKind {
    /// Every supported product, in registry order.
    pub const ALL: [DatabaseKind; 6] = [
        DatabaseKind::Mysql,
        DatabaseKind::Postgres,
        DatabaseKind::Oracle,
        DatabaseKind::SqlServer,
        DatabaseKind::H2,
        DatabaseKind::Db2,
    ];

    /// Resolve a case-insensitive product key.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlbridge_core::DatabaseKind;
    ///
    /// assert_eq!(DatabaseKind::from_key("PostgreSQL").unwrap(), DatabaseKind::Postgres);
    /// assert_eq!(DatabaseKind::from_key("mssql").unwrap(), DatabaseKind::SqlServer);
    /// assert!(DatabaseKind::from_key("access").is_err());
    /// ```
    pub fn from_key(key: &str) -> Result<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseKind::Mysql),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseKind::Postgres),
            "oracle" => Ok(DatabaseKind::Oracle),
            "sqlserver" | "mssql" | "sql server" => Ok(DatabaseKind::SqlServer),
            "h2" => Ok(DatabaseKind::H2),
            "db2" => Ok(DatabaseKind::Db2),
            other => Err(Error::config(format!("unknown database key '{}'", other))),
        }
    }

    /// Canonical key for this product.
    pub const fn key(&self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Postgres => "postgresql",
            DatabaseKind::Oracle => "oracle",
            DatabaseKind::SqlServer => "sqlserver",
            DatabaseKind::H2 => "h2",
            DatabaseKind::Db2 => "db2",
        }
    }
}

impl FromStr for DatabaseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for kind in DatabaseKind::ALL {
            assert_eq!(DatabaseKind::from_key(kind.key()).unwrap(), kind);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("MariaDB".parse::<DatabaseKind>().unwrap(), DatabaseKind::Mysql);
        assert_eq!(
            DatabaseKind::from_key(" Oracle ").unwrap(),
            DatabaseKind::Oracle
        );
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = DatabaseKind::from_key("sybase").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("sybase"));
    }
}
