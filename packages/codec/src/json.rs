//! JSON codec.

use bytes::Bytes;
use confit_tree::Document;
use serde::Serialize;

use crate::convert::{document_to_json, json_to_document};
use crate::{Codec, CodecError};

/// JSON codec.
///
/// Decoding is standard serde_json parsing; encoding pretty-prints with
/// 4-space indentation so rewritten files stay diffable.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use confit_codec::{Codec, JsonCodec};
///
/// let raw = Bytes::from_static(b"{\"name\": \"Toyota\"}");
/// let document = JsonCodec.decode(&raw).unwrap();
/// let encoded = JsonCodec.encode(&document).unwrap();
/// assert_eq!(JsonCodec.decode(&encoded).unwrap(), document);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, raw: &Bytes) -> Result<Document, CodecError> {
        let json: serde_json::Value =
            serde_json::from_slice(raw).map_err(|e| CodecError::decode("JSON", e))?;
        Ok(json_to_document(json))
    }

    fn encode(&self, document: &Document) -> Result<Bytes, CodecError> {
        let json = document_to_json(document.clone());
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        json.serialize(&mut serializer)
            .map_err(|e| CodecError::encode("JSON", e.to_string()))?;
        Ok(Bytes::from(out))
    }
}
