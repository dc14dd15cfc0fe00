//! SQLite adapters and the glue executing their statements through sqlx.
//!
//! SQLite transactions are serializable by construction. A subscriber which
//! lost the race for a consumer group finds out on its first write, when
//! SQLite refuses to upgrade its stale read transaction. Those refusals are
//! classified as [Error::Conflict](crate::Error::Conflict).

mod error;
mod executor;
mod offsets;
mod schema;

pub use error::is_conflict;
pub use executor::{begin, bind, execute, execute_all, fetch_all, fetch_scalar};
pub use offsets::DefaultSqliteOffsetsAdapter;
pub use schema::DefaultSqliteSchema;

/// Quote an identifier, doubling embedded quotes.
pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
