use crate::{codec::MetadataCodec, error::BoxError, message::Metadata};

/// Stores metadata as a JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl MetadataCodec for JsonCodec {
    fn encode(&self, metadata: &Metadata) -> Result<Vec<u8>, BoxError> {
        Ok(serde_json::to_vec(metadata)?)
    }

    fn decode(&self, buf: &[u8]) -> Result<Metadata, BoxError> {
        Ok(serde_json::from_slice(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_a_json_object() {
        let metadata = Metadata::from([("k".to_string(), "v".to_string())]);
        let buf = JsonCodec.encode(&metadata).unwrap();
        assert_eq!(buf, br#"{"k":"v"}"#);
        assert_eq!(JsonCodec.decode(&buf).unwrap(), metadata);
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(JsonCodec.decode(br#"{"k":1}"#).is_err());
        assert!(JsonCodec.decode(b"not json").is_err());
    }
}
