//! Adapters for MySQL and MariaDB.
//!
//! These only build statements; this crate does not ship a MySQL executor.
//! Unlike SQLite, InnoDB has real row locks: the claim reads the group's row
//! `FOR UPDATE`, making a second claimant wait, and the consumed-offset
//! upsert makes a claimant that slipped past the lock (no row existed yet)
//! deadlock with the first one. Run claims at `SERIALIZABLE`, InnoDB
//! defaults to `REPEATABLE READ`.

mod offsets;
mod schema;

pub use offsets::DefaultMySqlOffsetsAdapter;
pub use schema::DefaultMySqlSchema;

/// Quote an identifier with backticks, doubling embedded backticks.
pub(crate) fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
