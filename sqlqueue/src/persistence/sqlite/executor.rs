//! Runs adapter-built [Query] values through sqlx.

use sqlx::{
    sqlite::{SqliteArguments, SqliteRow},
    Executor, Row, Sqlite, SqlitePool, Transaction,
};
use tracing::trace;

use crate::{
    error::{Error, Result},
    persistence::IsolationLevel,
    query::{Arg, Query, ScanRow},
};

/// Bind every argument of `query` to its placeholder, in order.
pub fn bind(query: &Query) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    query
        .args
        .iter()
        .fold(sqlx::query(&query.sql), |q, arg| match arg {
            Arg::Int(v) => q.bind(*v),
            Arg::Text(v) => q.bind(v.as_str()),
            Arg::Blob(v) => q.bind(&v[..]),
            Arg::Null => q.bind(Option::<i64>::None),
        })
}

/// Execute a statement, returning the number of affected rows.
pub async fn execute<'c, E>(executor: E, query: &Query) -> Result<u64>
where
    E: Executor<'c, Database = Sqlite>,
{
    trace!(sql = %query.sql, args = ?query.args, "execute");
    let result = bind(query).execute(executor).await?;
    Ok(result.rows_affected())
}

/// Execute every statement in order, stopping at the first failure.
pub async fn execute_all(
    tx: &mut Transaction<'static, Sqlite>,
    queries: &[Query],
) -> Result<()> {
    for query in queries {
        execute(&mut *tx, query).await?;
    }
    Ok(())
}

pub async fn fetch_all<'c, E>(executor: E, query: &Query) -> Result<Vec<SqliteRow>>
where
    E: Executor<'c, Database = Sqlite>,
{
    trace!(sql = %query.sql, args = ?query.args, "fetch");
    Ok(bind(query).fetch_all(executor).await?)
}

/// Fetch the single integer produced by a scalar query such as
/// [OffsetsAdapter::claim_bound](crate::OffsetsAdapter::claim_bound).
pub async fn fetch_scalar<'c, E>(executor: E, query: &Query) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    trace!(sql = %query.sql, args = ?query.args, "fetch scalar");
    let row = bind(query).fetch_one(executor).await?;
    row.int(0)
}

/// Open a transaction suitable for `isolation`.
///
/// SQLite transactions are serializable, except for connections sharing a
/// cache with `read_uncommitted` turned on. That flag is set explicitly so a
/// pooled connection can never hand out dirty reads to a claim.
pub async fn begin(
    pool: &SqlitePool,
    isolation: IsolationLevel,
) -> Result<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;
    let pragma = match isolation {
        IsolationLevel::ReadUncommitted => "PRAGMA read_uncommitted = 1",
        _ => "PRAGMA read_uncommitted = 0",
    };
    trace!(?isolation, "begin");
    sqlx::query(pragma).execute(&mut tx).await?;
    Ok(tx)
}

fn scan_error(index: usize, error: sqlx::Error) -> Error {
    Error::Scan {
        index,
        source: Box::new(error),
    }
}

impl ScanRow for SqliteRow {
    fn int(&self, index: usize) -> Result<i64> {
        self.try_get::<i64, _>(index)
            .map_err(|e| scan_error(index, e))
    }

    fn text(&self, index: usize) -> Result<String> {
        self.try_get::<String, _>(index)
            .map_err(|e| scan_error(index, e))
    }

    fn blob(&self, index: usize) -> Result<Option<Vec<u8>>> {
        self.try_get::<Option<Vec<u8>>, _>(index)
            .map_err(|e| scan_error(index, e))
    }
}
