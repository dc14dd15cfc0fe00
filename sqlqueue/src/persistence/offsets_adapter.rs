use crate::{error::Result, message::MessageRow, query::Query};

/// Builds the statements tracking the progress of consumer groups.
///
/// Each group has a single row holding two watermarks. `offset_acked` is the
/// last offset whose processing is complete. `offset_consumed` is the last
/// offset a subscriber started processing and is only written to provoke
/// conflicts between racing transactions.
pub trait OffsetsAdapter: Send + Sync + 'static {
    /// Statements creating the offsets table, keyed by consumer group.
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>>;

    /// Selects the acknowledged offset of the group, or 0 when the group has
    /// never acknowledged anything, locking it until the end of the
    /// transaction.
    ///
    /// The statement must be usable as a scalar subquery, as it is embedded
    /// by [SchemaAdapter::select](crate::SchemaAdapter::select).
    fn claim_bound(&self, topic: &str, consumer_group: &str) -> Result<Query>;

    /// Records that processing of `row` has started.
    fn mark_consumed(&self, topic: &str, row: &MessageRow, consumer_group: &str)
        -> Result<Query>;

    /// Moves both watermarks to `row`.
    fn acknowledge(&self, topic: &str, row: &MessageRow, consumer_group: &str) -> Result<Query>;

    /// Backend specific setup run once before a subscriber starts polling.
    fn before_subscribing(&self, _topic: &str, _consumer_group: &str) -> Result<Vec<Query>> {
        Ok(Vec::new())
    }
}
