//! SQL identifier casing and quoting utilities.
//!
//! Every declared table carries a [`CaseSensitivity`] mode that controls how
//! its table and column names are written into SQL and how they are looked
//! up in a live catalog.

use serde::{Deserialize, Serialize};

/// Identifier case-sensitivity mode attached to a declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseSensitivity {
    /// Unquoted, as written; the database applies its own folding
    #[default]
    Default,
    /// Unquoted, upper-cased
    Upper,
    /// Unquoted, lower-cased
    Lower,
    /// Quoted, exactly as written
    Restrict,
}

/// How a database folds unquoted identifiers when storing them in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCase {
    /// Stored as written (MySQL on case-preserving file systems, SQL Server)
    AsWritten,
    /// Stored upper-cased (Oracle, H2, DB2)
    Upper,
    /// Stored lower-cased (PostgreSQL)
    Lower,
}

impl CaseSensitivity {
    /// Apply the mode's folding without quoting.
    pub fn fold(self, name: &str) -> String {
        match self {
            CaseSensitivity::Upper => name.to_uppercase(),
            CaseSensitivity::Lower => name.to_lowercase(),
            CaseSensitivity::Default | CaseSensitivity::Restrict => name.to_string(),
        }
    }

    /// The name under which a database with `native` folding stores `name`.
    pub fn catalog_name(self, name: &str, native: NativeCase) -> String {
        match (self, native) {
            (CaseSensitivity::Default, NativeCase::Upper) => name.to_uppercase(),
            (CaseSensitivity::Default, NativeCase::Lower) => name.to_lowercase(),
            (mode, _) => mode.fold(name),
        }
    }

    /// Whether catalog names must match exactly rather than ignoring case.
    pub const fn is_exact(self) -> bool {
        matches!(self, CaseSensitivity::Restrict)
    }
}

/// Compare a declared name with a catalog name under `mode`.
pub fn identifiers_match(declared: &str, live: &str, mode: CaseSensitivity) -> bool {
    if mode.is_exact() {
        declared == live
    } else {
        declared.eq_ignore_ascii_case(live)
    }
}

/// Quote a SQL identifier using ANSI double-quoting.
///
/// Embedded double-quotes are escaped by doubling them (`"` → `""`).
///
/// # Examples
///
/// ```
/// use sqlbridge_core::quote_ident;
///
/// assert_eq!(quote_ident("users"), "\"users\"");
/// assert_eq!(quote_ident("user\"name"), "\"user\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL identifier using MySQL backtick quoting.
#[inline]
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a SQL identifier using SQL Server bracket quoting.
///
/// Embedded closing brackets are escaped by doubling them.
#[inline]
pub fn quote_ident_bracket(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Render a string as a single-quoted SQL literal.
#[inline]
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Casing Tests ====================

    #[test]
    fn test_fold_modes() {
        assert_eq!(CaseSensitivity::Default.fold("UserName"), "UserName");
        assert_eq!(CaseSensitivity::Upper.fold("UserName"), "USERNAME");
        assert_eq!(CaseSensitivity::Lower.fold("UserName"), "username");
        assert_eq!(CaseSensitivity::Restrict.fold("UserName"), "UserName");
    }

    #[test]
    fn test_catalog_name_follows_native_folding() {
        assert_eq!(
            CaseSensitivity::Default.catalog_name("users", NativeCase::Upper),
            "USERS"
        );
        assert_eq!(
            CaseSensitivity::Default.catalog_name("Users", NativeCase::Lower),
            "users"
        );
        assert_eq!(
            CaseSensitivity::Restrict.catalog_name("Users", NativeCase::Upper),
            "Users"
        );
        assert_eq!(
            CaseSensitivity::Lower.catalog_name("Users", NativeCase::Upper),
            "users"
        );
    }

    #[test]
    fn test_identifiers_match() {
        assert!(identifiers_match("email", "EMAIL", CaseSensitivity::Default));
        assert!(!identifiers_match("email", "EMAIL", CaseSensitivity::Restrict));
    }

    // ==================== Quoting Tests ====================

    #[test]
    fn test_quote_ident_styles() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_ident_mysql("a`b"), "`a``b`");
        assert_eq!(quote_ident_bracket("a]b"), "[a]]b]");
    }

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
    }
}
