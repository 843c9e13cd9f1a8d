//! Borrowed database session.
//!
//! The core never owns a connection. Introspection borrows a [`Session`]
//! from the caller for the duration of one call; acquiring, pooling and
//! releasing the underlying connection stay with the caller.

use crate::row::Row;
use crate::value::Value;
use asupersync::{Cx, Outcome};

/// A caller-owned handle able to run catalog queries.
///
/// All operations are async and take a `Cx` context for cancellation/timeout support.
/// Implementations must be `Send + Sync` so dialect code can borrow them across
/// async boundaries.
///
/// # Example
///
/// ```rust,ignore
/// let rows = session
///     .query(&cx, "SELECT 1 FROM users WHERE id = ?", &[Value::Int(1)])
///     .await;
/// ```
pub trait Session: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, crate::Error>> + Send;
}
