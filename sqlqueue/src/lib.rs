//! # sqlqueue
//!
//! sqlqueue turns ordinary relational tables into an ordered message queue.
//! Each topic is an append-only table, and every consumer group reading it
//! has a cursor row recording how far it got.
//!
//! There is no broker and no in-process coordination. Publishers insert
//! rows, the database hands out offsets, and subscribers serialize their
//! progress through transactions: claiming a consumer group is reading its
//! cursor inside a transaction, and only one transaction can move a cursor
//! at a time. The loser of a race either waits or gets a conflict and tries
//! again.
//!
//! Delivery is at least once per consumer group and in offset order. A
//! group has effectively a single active consumer at any time: running more
//! subscribers in the same group gives failover, not parallelism.
//!
//! ## Getting started
//!
//! ``` no_run
//! use std::convert::Infallible;
//!
//! use async_trait::async_trait;
//! use sqlqueue::{
//!     sqlite::{DefaultSqliteOffsetsAdapter, DefaultSqliteSchema},
//!     Handler, Message, MessageRow, Publisher, PublisherConfig, Subscriber, SubscriberConfig,
//! };
//! use sqlx::SqlitePool;
//! use tokio::sync::oneshot;
//!
//! struct Billing;
//!
//! #[async_trait]
//! impl Handler for Billing {
//!     type Error = Infallible;
//!
//!     async fn handle(&self, row: &MessageRow) -> Result<(), Self::Error> {
//!         println!("billing order {} at offset {}", row.message.uuid, row.offset);
//!         Ok(())
//!     }
//! }
//!
//! # async fn inner() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = SqlitePool::connect("sqlite://queue.db?mode=rwc").await?;
//!
//! let publisher = Publisher::new(pool.clone(), DefaultSqliteSchema::new(), PublisherConfig::default());
//! publisher
//!     .publish("orders", &[Message::with_random_uuid("{\"total\":42}")])
//!     .await?;
//!
//! let subscriber = Subscriber::new(
//!     pool,
//!     DefaultSqliteSchema::new(),
//!     DefaultSqliteOffsetsAdapter::new(),
//!     SubscriberConfig::new("billing"),
//! );
//! let (_stop, stop_rx) = oneshot::channel();
//! subscriber.run("orders", &Billing, stop_rx, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate feature flags
//!
//! - `sqlite`: the SQLite backend, [Publisher] and [Subscriber]. Enabled by
//! default. Without it only the backend agnostic adapters are built.

pub(crate) mod codec;
pub(crate) mod constants;

mod error;
mod message;
mod naming;
mod persistence;
#[cfg(feature = "sqlite")]
pub mod publisher;
mod query;
#[cfg(feature = "sqlite")]
pub mod subscriber;

pub use codec::{JsonCodec, MetadataCodec};
pub use constants::DEFAULT_BATCH_SIZE;
pub use error::{BoxError, Error, Result};
pub use message::{Message, MessageRow, Metadata};
pub use naming::{validate_topic, TableNaming};
pub use persistence::*;
#[cfg(feature = "sqlite")]
pub use publisher::{Publisher, PublisherConfig};
pub use query::{Arg, Query, ScanRow};
#[cfg(feature = "sqlite")]
pub use subscriber::{Handler, Subscriber, SubscriberConfig};
