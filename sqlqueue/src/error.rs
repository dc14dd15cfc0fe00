use thiserror::Error;

/// Boxed error used where the underlying failure comes from a pluggable
/// collaborator (codecs, handlers, database drivers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything which can go wrong building, executing or consuming queue
/// statements.
#[derive(Debug, Error)]
pub enum Error {
    /// Metadata of a message could not be encoded. Fails the whole batch.
    #[error("could not encode metadata for message {uuid}")]
    Encoding {
        uuid: String,
        #[source]
        source: BoxError,
    },
    /// A fetched row could not be turned back into a message.
    #[error("could not decode message row at offset {offset:?}: {reason}")]
    Decode {
        offset: Option<i64>,
        reason: String,
        #[source]
        source: Option<BoxError>,
    },
    /// A column could not be read from a result row.
    #[error("could not scan column {index} of message row")]
    Scan {
        index: usize,
        #[source]
        source: BoxError,
    },
    /// Another transaction is advancing the same consumer group. Discard the
    /// transaction and claim again.
    #[error("concurrent claim conflict")]
    Conflict(#[source] BoxError),
    /// Any other failure reported by the database.
    #[error("database error")]
    Database(#[source] BoxError),
    /// Creating the tables for a topic failed.
    #[error("could not initialize schema for topic {topic}")]
    Schema {
        topic: String,
        #[source]
        source: Box<Error>,
    },
    /// The application handler rejected a message.
    #[error("handler failed for offset {offset}")]
    Handler {
        offset: i64,
        #[source]
        source: BoxError,
    },
    #[error("invalid topic name {0:?}")]
    InvalidTopic(String),
    #[error("cannot build an insert for an empty batch")]
    EmptyBatch,
}

impl Error {
    /// Conflicts are the expected outcome of two subscribers racing for the
    /// same consumer group and should be retried rather than reported.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    pub(crate) fn decode(offset: Option<i64>, reason: impl Into<String>) -> Self {
        Error::Decode {
            offset,
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn schema(topic: &str, source: Error) -> Self {
        Error::Schema {
            topic: topic.to_string(),
            source: Box::new(source),
        }
    }
}
