pub mod order;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};

pub const TOPIC: &str = "orders";

/// Connect to `DATABASE_URL`, defaulting to `queue.db` in the working
/// directory. Both demos must point at the same file.
pub async fn connect() -> Result<SqlitePool, sqlx::Error> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://queue.db".to_string());
    SqlitePool::connect_with(
        SqliteConnectOptions::from_str(database_url.as_str())?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal),
    )
    .await
}
