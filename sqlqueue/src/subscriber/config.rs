use std::time::Duration;

use crate::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_RETRY_INTERVAL};

/// Configuration of a [Subscriber](crate::Subscriber).
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// The cursor this subscriber advances. Subscribers sharing a group
    /// take turns, subscribers in different groups each see every message.
    pub consumer_group: String,
    /// How long to sleep after a poll which found nothing.
    pub poll_interval: Duration,
    /// How long to sleep after a failed poll before claiming again.
    pub retry_interval: Duration,
    /// Create the message and offsets tables before polling.
    pub initialize_schema: bool,
}

impl SubscriberConfig {
    pub fn new(consumer_group: impl Into<String>) -> Self {
        Self {
            consumer_group: consumer_group.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            initialize_schema: true,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn with_initialize_schema(mut self, initialize_schema: bool) -> Self {
        self.initialize_schema = initialize_schema;
        self
    }
}
