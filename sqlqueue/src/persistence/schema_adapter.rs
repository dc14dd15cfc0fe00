use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime};

use crate::{
    codec::MetadataCodec,
    constants::CREATED_AT_FORMATS,
    error::{Error, Result},
    message::{Message, MessageRow, Metadata},
    persistence::{IsolationLevel, OffsetsAdapter},
    query::{Arg, Query, ScanRow},
};

/// Builds the statements managing the message table of a topic.
///
/// Implementations must select the columns `offset, uuid, created_at,
/// payload, metadata` in that order if they rely on the default decoding.
pub trait SchemaAdapter: Send + Sync + 'static {
    /// Statements creating the message table. Running them again must neither
    /// fail nor touch existing rows.
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>>;

    /// A single statement inserting every message. Either every message is
    /// encoded or the call fails, there are no partial batches.
    fn insert(&self, topic: &str, messages: &[Message]) -> Result<Query>;

    /// Selects the next batch for `consumer_group`: messages strictly after
    /// the bound produced by [OffsetsAdapter::claim_bound], in ascending
    /// offset order.
    fn select(
        &self,
        topic: &str,
        consumer_group: &str,
        offsets: &dyn OffsetsAdapter,
    ) -> Result<Query>;

    /// Decode a row produced by [select](SchemaAdapter::select).
    fn decode(&self, row: &dyn ScanRow) -> Result<MessageRow>;

    /// Minimum isolation the claim and the select must run at so that the
    /// selected batch is consistent with the bound that was just locked.
    fn required_isolation(&self) -> IsolationLevel {
        IsolationLevel::Serializable
    }
}

/// `(?,?,?),(?,?,?),...` for `count` messages.
pub(crate) fn values_placeholders(count: usize) -> String {
    vec!["(?,?,?)"; count].join(",")
}

/// Arguments for an insert of `(uuid, payload, metadata)` per message.
pub(crate) fn insert_args(messages: &[Message], codec: &dyn MetadataCodec) -> Result<Vec<Arg>> {
    if messages.is_empty() {
        return Err(Error::EmptyBatch);
    }
    let mut args = Vec::with_capacity(messages.len() * 3);
    for msg in messages {
        let metadata = codec.encode(&msg.metadata).map_err(|source| Error::Encoding {
            uuid: msg.uuid.clone(),
            source,
        })?;
        args.push(Arg::Text(msg.uuid.clone()));
        args.push(Arg::Blob(msg.payload.clone()));
        args.push(Arg::Blob(metadata.into()));
    }
    Ok(args)
}

/// Timestamps with an offset are converted to UTC.
pub(crate) fn parse_created_at(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    CREATED_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Decodes `offset, uuid, created_at, payload, metadata`.
pub(crate) fn decode_row(row: &dyn ScanRow, codec: &dyn MetadataCodec) -> Result<MessageRow> {
    let offset = row.int(0)?;
    let uuid = row.text(1)?;
    let created_at = row.text(2)?;
    let created_at = parse_created_at(&created_at).ok_or_else(|| {
        Error::decode(Some(offset), format!("invalid created_at {created_at:?}"))
    })?;
    let payload = row.blob(3)?.map(Bytes::from).unwrap_or_default();
    let metadata = match row.blob(4)? {
        Some(buf) => codec.decode(&buf).map_err(|source| Error::Decode {
            offset: Some(offset),
            reason: "could not decode metadata".to_string(),
            source: Some(source),
        })?,
        None => Metadata::new(),
    };

    Ok(MessageRow {
        offset,
        created_at,
        message: Message {
            uuid,
            payload,
            metadata,
        },
    })
}
