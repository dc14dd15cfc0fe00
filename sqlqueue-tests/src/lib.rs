//! Shared fixtures for the sqlqueue integration tests.

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use sqlqueue::{Handler, MessageRow};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// An on-disk database in WAL mode inside a temporary directory, removed
/// with the directory when dropped.
///
/// In-memory databases use a shared cache across pooled connections, whose
/// table locks behave differently from the file locks real deployments see.
pub struct TestDb {
    pub pool: SqlitePool,
    temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("queue.db"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();
        Self { pool, temp_dir }
    }

    /// Directory holding the database file and its WAL.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Route the library's logs through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every row it is handed. Fails on the offsets in `fail_on`.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub handled: Arc<Mutex<Vec<MessageRow>>>,
    pub fail_on: Arc<Mutex<Vec<i64>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn failing_on(offset: i64) -> Self {
        let recorder = Self::new();
        recorder.fail_on.lock().unwrap().push(offset);
        recorder
    }

    pub fn stop_failing(&self) {
        self.fail_on.lock().unwrap().clear();
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.handled.lock().unwrap().iter().map(|r| r.offset).collect()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("refusing offset {0}")]
pub struct Refused(pub i64);

#[async_trait]
impl Handler for Recorder {
    type Error = Refused;

    async fn handle(&self, row: &MessageRow) -> Result<(), Self::Error> {
        self.handled.lock().unwrap().push(row.clone());
        if self.fail_on.lock().unwrap().contains(&row.offset) {
            return Err(Refused(row.offset));
        }
        Ok(())
    }
}
