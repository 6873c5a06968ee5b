//! Conversions between Document and serde types.

use confit_tree::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::CodecError;

/// Convert a Document to a Rust type via serde.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, CodecError> {
    // Convert Document to serde_json::Value first, then deserialize
    let json = document_to_json(document);
    serde_json::from_value(json).map_err(|e| CodecError::decode("document", e))
}

/// Convert a Rust type to a Document via serde.
pub fn to_document<T: Serialize>(data: &T) -> Result<Document, CodecError> {
    // Serialize to serde_json::Value first, then convert to Document
    let json = serde_json::to_value(data)
        .map_err(|e| CodecError::encode("document", e.to_string()))?;
    Ok(json_to_document(json))
}

/// Convert a Document to serde_json::Value.
pub fn document_to_json(document: Document) -> serde_json::Value {
    match document {
        Document::Null => serde_json::Value::Null,
        Document::Bool(b) => serde_json::Value::Bool(b),
        Document::Integer(i) => serde_json::Value::Number(i.into()),
        Document::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Document::String(s) => serde_json::Value::String(s),
        Document::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(document_to_json).collect())
        }
        Document::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, document_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to a Document.
pub fn json_to_document(json: serde_json::Value) -> Document {
    match json {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Document::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Document::Float(f)
            } else {
                // Fallback for very large numbers
                Document::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Document::String(s),
        serde_json::Value::Array(arr) => {
            Document::Array(arr.into_iter().map(json_to_document).collect())
        }
        serde_json::Value::Object(map) => Document::Object(
            map.into_iter()
                .map(|(k, v)| (k, json_to_document(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestStruct {
        name: String,
        year: u32,
        electric: bool,
    }

    #[test]
    fn roundtrip_struct() {
        let original = TestStruct {
            name: "Toyota".to_string(),
            year: 2000,
            electric: false,
        };

        let document = to_document(&original).unwrap();
        let recovered: TestStruct = from_document(document).unwrap();

        assert_eq!(original, recovered);
    }

    #[test]
    fn json_to_document_numbers() {
        let json = serde_json::json!({
            "integer": 42,
            "float": 2.75,
            "negative": -100
        });

        let document = json_to_document(json);
        match document {
            Document::Object(map) => {
                assert_eq!(map.get("integer"), Some(&Document::Integer(42)));
                assert_eq!(map.get("negative"), Some(&Document::Integer(-100)));
                match map.get("float") {
                    Some(Document::Float(f)) => assert!((f - 2.75).abs() < 0.001),
                    other => panic!("expected float, got {:?}", other),
                }
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn null_and_nested_round_trip() {
        let json = serde_json::json!({
            "present": null,
            "nested": {"list": [1, "two", true]}
        });

        let document = json_to_document(json.clone());
        assert_eq!(document_to_json(document), json);
    }
}
