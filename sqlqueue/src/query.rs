//! Statements are built by the adapters as plain values and executed by
//! whichever backend owns the connection. This keeps the adapters free of any
//! driver types.

use bytes::Bytes;

use crate::error::Result;

/// A positional statement argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Int(i64),
    Text(String),
    Blob(Bytes),
    Null,
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<Bytes> for Arg {
    fn from(v: Bytes) -> Self {
        Arg::Blob(v)
    }
}

/// A composed SQL statement and the arguments bound to its placeholders, in
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Arg>,
}

impl Query {
    pub fn new(sql: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// A statement without placeholders.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

/// Reads fixed-position columns from the current result row, independent of
/// the driver producing it.
pub trait ScanRow {
    fn int(&self, index: usize) -> Result<i64>;
    fn text(&self, index: usize) -> Result<String>;
    /// A nullable binary column.
    fn blob(&self, index: usize) -> Result<Option<Vec<u8>>>;
}
