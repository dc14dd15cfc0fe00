//! # Adapters describing how a topic is laid out in a database
//!
//! Two adapters define the durable contract of a topic:
//!
//! - a [SchemaAdapter] owns the table holding the messages of a topic. It
//! builds the statements to create it, to insert a batch of messages, to
//! select the next batch for a consumer group and it decodes selected rows.
//! - an [OffsetsAdapter] owns the table holding one cursor per consumer
//! group and the claim protocol serializing the progress of each group.
//!
//! Adapters only *build* [Query](crate::Query) values. Executing them is
//! left to the backend owning the connection (see [sqlite]), so the same
//! adapter logic works with any driver able to bind positional arguments.
//!
//! ## The claim protocol
//!
//! There is no in-process locking. A subscriber opens a transaction at
//! [SchemaAdapter::required_isolation] and reads the acknowledged offset of
//! its group through [OffsetsAdapter::claim_bound], which also takes the
//! backend's row lock where it has one. The next batch is every message
//! strictly after that bound.
//!
//! Before handing a message to the application the subscriber records it
//! with [OffsetsAdapter::mark_consumed]. Nothing reads that value back: the
//! write exists so that a second transaction racing for the same group
//! collides with the first one, either blocking on the lock or failing with
//! a conflict which it must treat as "start again". Once the message has been
//! handled [OffsetsAdapter::acknowledge] moves the acknowledged offset
//! forward, which becomes durable on commit.
//!
//! A crash or failure at any point before the commit rolls everything back,
//! so the same messages are selected on the next attempt. Delivery is at
//! least once, and handlers must be idempotent.
//!
//! ## Customization
//!
//! Table names are generated by a [TableNaming](crate::TableNaming)
//! strategy held in the adapter configuration. Table layout and decoding can
//! be replaced without reimplementing a whole adapter by wrapping it in a
//! [SchemaDecorator].

mod decorator;
pub mod mysql;
mod offsets_adapter;
mod schema_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use decorator::SchemaDecorator;
pub use offsets_adapter::OffsetsAdapter;
pub use schema_adapter::SchemaAdapter;

/// Transaction isolation levels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}
