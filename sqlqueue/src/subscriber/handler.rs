use std::error::Error;

use async_trait::async_trait;

use crate::message::MessageRow;

/// Application logic consuming the messages of a topic.
///
/// A message is acknowledged only once `handle` returns `Ok`. Messages may be
/// delivered more than once (after a crash, or when a later message in the
/// same batch fails), so handlers must be idempotent.
#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    async fn handle(&self, row: &MessageRow) -> Result<(), Self::Error>;
}
