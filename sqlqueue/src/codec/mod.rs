//! Metadata is persisted as an opaque blob. The encoding is pluggable so
//! callers sharing tables with other producers can match their format.

mod json;

pub use json::JsonCodec;

use crate::{error::BoxError, message::Metadata};

/// Converts [Metadata] to and from its stored binary form.
pub trait MetadataCodec: Send + Sync + 'static {
    fn encode(&self, metadata: &Metadata) -> Result<Vec<u8>, BoxError>;
    fn decode(&self, buf: &[u8]) -> Result<Metadata, BoxError>;
}
