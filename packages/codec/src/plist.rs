//! Property-list codec.
//!
//! Reads both XML and binary plists; always writes XML. Two plist types
//! have no Document counterpart and are carried as strings: `Data` as
//! base64, `Date` as RFC 3339. An edited document writes those values back
//! as plist strings.

use std::io::Cursor;

use base64::Engine;
use bytes::Bytes;
use confit_tree::Document;

use crate::{Codec, CodecError};

/// Apple property-list codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlistCodec;

impl Codec for PlistCodec {
    fn decode(&self, raw: &Bytes) -> Result<Document, CodecError> {
        let value = ::plist::Value::from_reader(Cursor::new(raw.as_ref()))
            .map_err(|e| CodecError::decode("PLIST", e))?;
        Ok(plist_to_document(value))
    }

    fn encode(&self, document: &Document) -> Result<Bytes, CodecError> {
        let value = document_to_plist(document)?;
        let mut out = Vec::new();
        value
            .to_writer_xml(&mut out)
            .map_err(|e| CodecError::encode("PLIST", e.to_string()))?;
        Ok(Bytes::from(out))
    }
}

fn plist_to_document(value: ::plist::Value) -> Document {
    match value {
        ::plist::Value::Array(items) => {
            Document::Array(items.into_iter().map(plist_to_document).collect())
        }
        ::plist::Value::Dictionary(dict) => Document::Object(
            dict.into_iter()
                .map(|(key, value)| (key, plist_to_document(value)))
                .collect(),
        ),
        ::plist::Value::Boolean(b) => Document::Bool(b),
        ::plist::Value::Data(data) => {
            Document::String(base64::engine::general_purpose::STANDARD.encode(&data))
        }
        ::plist::Value::Date(date) => {
            let time: std::time::SystemTime = date.into();
            let time: chrono::DateTime<chrono::Utc> = time.into();
            Document::String(time.to_rfc3339())
        }
        ::plist::Value::Real(f) => Document::Float(f),
        ::plist::Value::Integer(i) => match i.as_signed() {
            Some(v) => Document::Integer(v),
            // Only reachable for values above i64::MAX.
            None => i
                .as_unsigned()
                .map_or(Document::Null, |v| Document::Float(v as f64)),
        },
        ::plist::Value::String(s) => Document::String(s),
        ::plist::Value::Uid(uid) => Document::Integer(uid.get() as i64),
        _ => Document::Null,
    }
}

fn document_to_plist(document: &Document) -> Result<::plist::Value, CodecError> {
    Ok(match document {
        Document::Null => {
            return Err(CodecError::encode(
                "PLIST",
                "null has no property-list representation",
            ))
        }
        Document::Bool(b) => ::plist::Value::Boolean(*b),
        Document::Integer(i) => ::plist::Value::Integer((*i).into()),
        Document::Float(f) => ::plist::Value::Real(*f),
        Document::String(s) => ::plist::Value::String(s.clone()),
        Document::Array(items) => ::plist::Value::Array(
            items
                .iter()
                .map(document_to_plist)
                .collect::<Result<_, _>>()?,
        ),
        Document::Object(map) => {
            let mut dict = ::plist::Dictionary::new();
            for (key, value) in map {
                dict.insert(key.clone(), document_to_plist(value)?);
            }
            ::plist::Value::Dictionary(dict)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML_PLIST: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>name</key>
    <string>Toyota</string>
    <key>year</key>
    <integer>2000</integer>
    <key>electric</key>
    <false/>
    <key>tags</key>
    <array>
        <string>sedan</string>
        <string>family</string>
    </array>
</dict>
</plist>
"#;

    fn obj<const N: usize>(entries: [(&str, Document); N]) -> Document {
        Document::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn decode_xml_plist() {
        let document = PlistCodec.decode(&Bytes::from_static(XML_PLIST)).unwrap();
        let expected = obj([
            ("name", "Toyota".into()),
            ("year", 2000i64.into()),
            ("electric", false.into()),
            ("tags", Document::from(vec!["sedan", "family"])),
        ]);
        assert_eq!(document, expected);
    }

    #[test]
    fn round_trip_is_stable() {
        let once = PlistCodec.decode(&Bytes::from_static(XML_PLIST)).unwrap();
        let encoded = PlistCodec.encode(&once).unwrap();
        let twice = PlistCodec.decode(&encoded).unwrap();
        assert_eq!(once, twice);

        // Our own output re-encodes byte-identically.
        assert_eq!(PlistCodec.encode(&twice).unwrap(), encoded);
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        let raw = Bytes::from_static(b"<plist><dict><key>unterminated");
        assert!(matches!(
            PlistCodec.decode(&raw),
            Err(CodecError::Decode { .. })
        ));
    }

    #[test]
    fn null_fails_to_encode() {
        let document = obj([("gone", Document::Null)]);
        assert!(matches!(
            PlistCodec.encode(&document),
            Err(CodecError::Encode { .. })
        ));
    }

    #[test]
    fn data_decodes_to_base64_string() {
        let raw = Bytes::from_static(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>blob</key><data>aGVsbG8=</data></dict></plist>
"#,
        );
        let document = PlistCodec.decode(&raw).unwrap();
        assert_eq!(document, obj([("blob", "aGVsbG8=".into())]));
    }
}
