//! MySQL / MariaDB.

use super::Dialect;
use sqlbridge_core::{DatabaseKind, NativeCase, quote_ident_mysql};

/// MySQL-family strategy: backtick quoting, native bitwise operators,
/// `LIMIT ? OFFSET ?` paging, no FULL JOIN.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Mysql
    }

    fn native_case(&self) -> NativeCase {
        NativeCase::AsWritten
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_ident_mysql(name)
    }

    fn supports_full_join(&self) -> bool {
        false
    }
}
