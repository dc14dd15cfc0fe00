//! A [Publisher] appends batches of messages to topic tables.
//!
//! Publishing is a single `INSERT` per call, so a batch is either stored as
//! a whole or not at all. The database assigns offsets in insertion order.
//!
//! ``` no_run
//! # use sqlqueue::{sqlite::DefaultSqliteSchema, Message, Publisher, PublisherConfig};
//! # use sqlx::SqlitePool;
//! # async fn inner(pool: SqlitePool) -> sqlqueue::Result<()> {
//! let publisher = Publisher::new(pool, DefaultSqliteSchema::new(), PublisherConfig::default());
//! publisher
//!     .publish(
//!         "orders",
//!         &[Message::with_random_uuid("order #1").with_metadata("customer", "42")],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;

use std::{collections::HashSet, sync::Arc};

pub use config::PublisherConfig;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    message::Message,
    naming::validate_topic,
    persistence::{
        sqlite::{execute, execute_all},
        SchemaAdapter,
    },
};

pub struct Publisher<S> {
    pool: SqlitePool,
    schema: Arc<S>,
    config: PublisherConfig,
    /// Topics whose schema has been initialized by this publisher.
    initialized: Mutex<HashSet<String>>,
}

impl<S: SchemaAdapter> Publisher<S> {
    pub fn new(pool: SqlitePool, schema: S, config: PublisherConfig) -> Self {
        Self {
            pool,
            schema: Arc::new(schema),
            config,
            initialized: Default::default(),
        }
    }

    /// Create the message table of `topic`. Safe to call repeatedly.
    pub async fn initialize(&self, topic: &str) -> Result<()> {
        let queries = self
            .schema
            .init_schema(topic)
            .map_err(|e| Error::schema(topic, e))?;
        let mut tx = self.pool.begin().await.map_err(|e| Error::schema(topic, e.into()))?;
        execute_all(&mut tx, &queries)
            .await
            .map_err(|e| Error::schema(topic, e))?;
        tx.commit().await.map_err(|e| Error::schema(topic, e.into()))?;
        info!(topic, "initialized message schema");
        Ok(())
    }

    /// Append `messages` to `topic` in order. Publishing nothing is a no-op.
    ///
    /// An invalid topic fails with [Error::InvalidTopic] whether or not the
    /// schema is initialized automatically.
    pub async fn publish(&self, topic: &str, messages: &[Message]) -> Result<()> {
        validate_topic(topic)?;
        if messages.is_empty() {
            return Ok(());
        }
        if self.config.auto_initialize_schema {
            self.ensure_initialized(topic).await?;
        }
        let query = self.schema.insert(topic, messages)?;
        let inserted = execute(&self.pool, &query).await?;
        debug!(topic, inserted, "published messages");
        Ok(())
    }

    async fn ensure_initialized(&self, topic: &str) -> Result<()> {
        let mut initialized = self.initialized.lock().await;
        if !initialized.contains(topic) {
            self.initialize(topic).await?;
            initialized.insert(topic.to_string());
        }
        Ok(())
    }
}
