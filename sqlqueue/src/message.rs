use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// String keyed metadata travelling alongside a payload.
pub type Metadata = BTreeMap<String, String>;

/// A unit of data published to a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Caller assigned identifier. Not required to be unique.
    pub uuid: String,
    pub payload: Bytes,
    pub metadata: Metadata,
}

impl Message {
    pub fn new(uuid: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            uuid: uuid.into(),
            payload: payload.into(),
            metadata: Metadata::new(),
        }
    }

    /// Create a message identified by a random v4 UUID.
    pub fn with_random_uuid(payload: impl Into<Bytes>) -> Self {
        Self::new(Uuid::new_v4().to_string(), payload)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A message as it was read back from a topic table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    /// Position of the message in its topic, assigned by the database.
    pub offset: i64,
    pub created_at: NaiveDateTime,
    pub message: Message,
}
