//! Native type parsing and live-value normalization.
//!
//! Both sides of a column comparison pass through here: the declared type
//! produced by a dialect's type table, and the `data_type`/`column_default`
//! reported by the catalog. Normalizing both into the same shape keeps the
//! diff free of per-database string quirks.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Parsed SQL type with extracted metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedSqlType {
    /// Base type name, upper-cased (e.g. VARCHAR, NUMBER, DOUBLE PRECISION)
    pub base_type: String,
    /// Length for character and binary types (e.g. VARCHAR(255) -> 255)
    pub length: Option<u32>,
    /// Precision for numeric types (e.g. DECIMAL(10,2) -> 10)
    pub precision: Option<u32>,
    /// Scale for numeric types (e.g. DECIMAL(10,2) -> 2)
    pub scale: Option<u32>,
    /// Whether the type is UNSIGNED (MySQL)
    pub unsigned: bool,
}

impl ParsedSqlType {
    /// Parse a SQL type string into structured metadata.
    ///
    /// A single parameter on a decimal-family type is a precision with an
    /// implicit scale of zero; on any other type it is a length. Parameters
    /// that are not numbers (`MAX`, `6 CHAR`) leave the field unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlbridge_schema::ParsedSqlType;
    ///
    /// let t = ParsedSqlType::parse("varchar(255)");
    /// assert_eq!(t.base_type, "VARCHAR");
    /// assert_eq!(t.length, Some(255));
    ///
    /// let n = ParsedSqlType::parse("NUMBER(10)");
    /// assert_eq!((n.precision, n.scale), (Some(10), Some(0)));
    /// ```
    pub fn parse(type_str: &str) -> Self {
        let upper = type_str.trim().to_uppercase();

        let (type_str, unsigned) = match upper.strip_suffix(" UNSIGNED") {
            Some(rest) => (rest.trim_end(), true),
            None => (upper.as_str(), false),
        };

        let Some(paren_start) = type_str.find('(') else {
            return Self {
                base_type: type_str.to_string(),
                unsigned,
                ..Self::default()
            };
        };

        let base_type = type_str[..paren_start].trim().to_string();
        let close = type_str[paren_start..]
            .find(')')
            .map_or(type_str.len(), |i| paren_start + i);
        let params = &type_str[paren_start + 1..close];
        let number = |s: &str| s.trim().parse::<u32>().ok();

        let mut parsed = Self {
            base_type,
            unsigned,
            ..Self::default()
        };
        if let Some((p, s)) = params.split_once(',') {
            parsed.precision = number(p);
            parsed.scale = number(s);
        } else if parsed.is_decimal_family() {
            parsed.precision = number(params);
            parsed.scale = parsed.precision.map(|_| 0);
        } else {
            parsed.length = number(params);
        }
        parsed
    }

    /// Character types whose length is significant.
    pub fn is_text(&self) -> bool {
        matches!(
            self.base_type.as_str(),
            "VARCHAR"
                | "VARCHAR2"
                | "NVARCHAR"
                | "NVARCHAR2"
                | "CHAR"
                | "NCHAR"
                | "VARBINARY"
                | "RAW"
        )
    }

    /// Exact numeric types whose precision and scale are significant.
    pub fn is_decimal_family(&self) -> bool {
        matches!(self.base_type.as_str(), "DECIMAL" | "NUMERIC" | "NUMBER")
    }
}

static PG_CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::[A-Za-z_][A-Za-z0-9_ ]*(\(\d+(,\s*\d+)?\))?(\[\])?").expect("static pattern")
});

/// Normalize a default-value literal for comparison.
///
/// Strips wrapping parentheses (`((0))`), PostgreSQL casts
/// (`'a'::character varying`), surrounding quotes and trailing whitespace.
/// A literal `NULL` and an empty string both normalize to `None`.
///
/// ```
/// use sqlbridge_schema::normalize_default;
///
/// assert_eq!(normalize_default("(('active'))").as_deref(), Some("active"));
/// assert_eq!(normalize_default("'x'::character varying").as_deref(), Some("x"));
/// assert_eq!(normalize_default("NULL"), None);
/// ```
pub fn normalize_default(raw: &str) -> Option<String> {
    let mut text = PG_CAST.replace_all(raw.trim(), "").trim().to_string();

    while text.starts_with('(') && text.ends_with(')') && balanced_inner(&text) {
        text = text[1..text.len() - 1].trim().to_string();
    }

    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        text = text[1..text.len() - 1].replace("''", "'");
    } else if text.eq_ignore_ascii_case("NULL") {
        return None;
    }

    if text.is_empty() { None } else { Some(text) }
}

/// Whether the outer parentheses of `text` enclose the whole string.
fn balanced_inner(text: &str) -> bool {
    let inner = &text[1..text.len() - 1];
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Compare two normalized defaults.
///
/// With `numeric` set, values that both parse as decimals compare by value,
/// so `1` equals `1.0`. Everything else compares as text, ignoring case for
/// keywords such as `CURRENT_TIMESTAMP`.
pub fn defaults_equal(declared: Option<&str>, live: Option<&str>, numeric: bool) -> bool {
    match (declared, live) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            if numeric {
                if let (Ok(x), Ok(y)) = (Decimal::from_str(a.trim()), Decimal::from_str(b.trim())) {
                    return x == y;
                }
            }
            a == b || a.eq_ignore_ascii_case(b)
        }
        _ => false,
    }
}
