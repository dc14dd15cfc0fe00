//! A [Subscriber] advances one consumer group through a topic.
//!
//! Every poll is a single transaction walking the per-group state machine:
//!
//! 1. **Claiming**: read the group's acknowledged offset, taking the claim.
//! 2. **Processing**: select the next batch after that offset and, for each
//! message in order, mark it consumed and hand it to the [Handler].
//! 3. **Acked**: acknowledge each handled message and commit once the batch
//! is done.
//!
//! A handler failure rolls the whole transaction back and the batch is
//! selected again on the next poll. So does a crash, or dropping the poll
//! future, as an uncommitted [sqlx::Transaction] is rolled back when it is
//! dropped.
//!
//! When two subscribers of the same group race, one of them gets a conflict
//! from the database. That is not an error from the point of view of the
//! application: [Subscriber::run] logs it and claims again.

mod config;
mod handler;

use std::sync::Arc;

pub use config::SubscriberConfig;
pub use handler::Handler;
use sqlx::SqlitePool;
use tokio::{
    select,
    sync::{
        mpsc::UnboundedSender,
        oneshot::{self, error::TryRecvError},
    },
    time::sleep,
};
use tracing::{debug, error, info, trace, warn};

use crate::{
    error::{Error, Result},
    persistence::{
        sqlite::{begin, execute, execute_all, fetch_all, fetch_scalar},
        OffsetsAdapter, SchemaAdapter,
    },
    query::Query,
};

pub struct Subscriber<S, O> {
    pool: SqlitePool,
    schema: Arc<S>,
    offsets: Arc<O>,
    config: SubscriberConfig,
}

impl<S: SchemaAdapter, O: OffsetsAdapter> Subscriber<S, O> {
    pub fn new(pool: SqlitePool, schema: S, offsets: O, config: SubscriberConfig) -> Self {
        Self {
            pool,
            schema: Arc::new(schema),
            offsets: Arc::new(offsets),
            config,
        }
    }

    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// Create the offsets and message tables of `topic`. Safe to call
    /// repeatedly.
    pub async fn initialize(&self, topic: &str) -> Result<()> {
        let mut queries = self
            .offsets
            .init_schema(topic)
            .map_err(|e| Error::schema(topic, e))?;
        queries.extend(
            self.schema
                .init_schema(topic)
                .map_err(|e| Error::schema(topic, e))?,
        );
        self.run_setup(topic, &queries).await?;
        info!(topic, "initialized subscriber schema");
        Ok(())
    }

    /// Run the offsets adapter's setup for this consumer group.
    pub async fn before_subscribing(&self, topic: &str) -> Result<()> {
        let queries = self
            .offsets
            .before_subscribing(topic, &self.config.consumer_group)
            .map_err(|e| Error::schema(topic, e))?;
        if !queries.is_empty() {
            self.run_setup(topic, &queries).await?;
        }
        Ok(())
    }

    async fn run_setup(&self, topic: &str, queries: &[Query]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::schema(topic, e.into()))?;
        execute_all(&mut tx, queries)
            .await
            .map_err(|e| Error::schema(topic, e))?;
        tx.commit().await.map_err(|e| Error::schema(topic, e.into()))
    }

    /// Claim the consumer group, deliver the next batch to `handler` and
    /// acknowledge it. Returns the number of acknowledged messages, 0 when
    /// the group has caught up.
    ///
    /// If a row fails to decode, the messages before it stay acknowledged
    /// and the decode error is returned.
    pub async fn poll_once<H: Handler>(&self, topic: &str, handler: &H) -> Result<usize> {
        let group = self.config.consumer_group.as_str();
        let claim = self.offsets.claim_bound(topic, group)?;
        let select = self.schema.select(topic, group, self.offsets.as_ref())?;

        let mut tx = begin(&self.pool, self.schema.required_isolation()).await?;
        let bound = fetch_scalar(&mut tx, &claim).await?;
        let rows = fetch_all(&mut tx, &select).await?;
        trace!(topic, consumer_group = group, bound, rows = rows.len(), "claimed");
        if rows.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        let mut acked = 0;
        for raw in &rows {
            let row = match self.schema.decode(raw) {
                Ok(row) => row,
                Err(e) => {
                    tx.commit().await?;
                    return Err(e);
                }
            };
            execute(&mut tx, &self.offsets.mark_consumed(topic, &row, group)?).await?;
            if let Err(e) = handler.handle(&row).await {
                if let Err(rollback) = tx.rollback().await {
                    warn!(topic, consumer_group = group, "Failed to roll back: {rollback}");
                }
                return Err(Error::Handler {
                    offset: row.offset,
                    source: Box::new(e),
                });
            }
            execute(&mut tx, &self.offsets.acknowledge(topic, &row, group)?).await?;
            acked += 1;
        }
        tx.commit().await?;
        debug!(topic, consumer_group = group, bound, acked, "acknowledged batch");
        Ok(acked)
    }

    /// Poll `topic` until a shutdown signal arrives on `shutdown`, or its
    /// sender is dropped.
    ///
    /// Conflicts with other subscribers are retried silently. Decode,
    /// handler and database errors are logged, forwarded to `errors` when
    /// given, and retried after [SubscriberConfig::retry_interval]. Only a
    /// failure to set up the schema ends the loop with an error.
    ///
    /// A poll in progress is always finished so its batch is committed. The
    /// sleeps between polls are interrupted by the signal.
    pub async fn run<H: Handler>(
        &self,
        topic: &str,
        handler: &H,
        mut shutdown: oneshot::Receiver<()>,
        errors: Option<UnboundedSender<Error>>,
    ) -> Result<()> {
        let group = self.config.consumer_group.as_str();
        if self.config.initialize_schema {
            self.initialize(topic).await?;
        }
        self.before_subscribing(topic).await?;
        info!(topic, consumer_group = group, "subscribed");

        loop {
            if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
                break;
            }
            let pause = match self.poll_once(topic, handler).await {
                Ok(0) => self.config.poll_interval,
                Ok(_) => continue,
                Err(e) if e.is_conflict() => {
                    debug!(topic, consumer_group = group, "Lost claim race, retrying: {e}");
                    self.config.retry_interval
                }
                Err(e) => {
                    error!(topic, consumer_group = group, "Poll failed: {e}");
                    if let Some(errors) = &errors {
                        if errors.send(e).is_err() {
                            warn!("Error channel closed");
                        }
                    }
                    self.config.retry_interval
                }
            };
            select! {
                _ = &mut shutdown => break,
                _ = sleep(pause) => {}
            }
        }
        info!(topic, consumer_group = group, "stopped");
        Ok(())
    }
}
