//! INI codec.
//!
//! INI carries exactly two levels: section → key → scalar value. Decoding
//! produces an object of section objects whose values are all strings;
//! encoding renders `[section]` headers and `key = value` lines, and fails
//! fast on any value nested deeper than that.

use std::collections::BTreeMap;

use bytes::Bytes;
use confit_tree::Document;

use crate::{Codec, CodecError};

/// INI codec (two-level section/key/value shape).
#[derive(Debug, Clone, Copy, Default)]
pub struct IniCodec;

impl Codec for IniCodec {
    fn decode(&self, raw: &Bytes) -> Result<Document, CodecError> {
        let text = std::str::from_utf8(raw).map_err(|e| CodecError::decode("INI", e))?;

        let mut sections: BTreeMap<String, Document> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| {
                    CodecError::decode(
                        "INI",
                        format!("unterminated section header at line {}", number + 1),
                    )
                })?;
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_insert_with(Document::object);
                current = Some(name);
            } else if let Some((key, value)) = line.split_once('=') {
                let section = current.as_ref().ok_or_else(|| {
                    CodecError::decode(
                        "INI",
                        format!("property before any section header at line {}", number + 1),
                    )
                })?;
                if let Some(Document::Object(entries)) = sections.get_mut(section) {
                    entries.insert(
                        key.trim().to_string(),
                        Document::String(value.trim().to_string()),
                    );
                }
            } else {
                return Err(CodecError::decode(
                    "INI",
                    format!(
                        "line {} is neither a section header nor a key=value pair",
                        number + 1
                    ),
                ));
            }
        }

        Ok(Document::Object(sections))
    }

    fn encode(&self, document: &Document) -> Result<Bytes, CodecError> {
        let Document::Object(sections) = document else {
            return Err(CodecError::encode(
                "INI",
                format!(
                    "top level must be an object of sections, found {}",
                    document.type_name()
                ),
            ));
        };

        let mut out = String::new();
        for (name, section) in sections {
            let Document::Object(entries) = section else {
                return Err(CodecError::encode(
                    "INI",
                    format!(
                        "section '{}' must be an object, found {}",
                        name,
                        section.type_name()
                    ),
                ));
            };

            out.push('[');
            out.push_str(name);
            out.push_str("]\n");
            for (key, value) in entries {
                let rendered = render_scalar(name, key, value)?;
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(&rendered);
                out.push('\n');
            }
            out.push('\n');
        }

        Ok(Bytes::from(out))
    }
}

fn render_scalar(section: &str, key: &str, value: &Document) -> Result<String, CodecError> {
    let rendered = match value {
        Document::String(s) => s.clone(),
        Document::Integer(i) => i.to_string(),
        Document::Float(f) => f.to_string(),
        Document::Bool(b) => b.to_string(),
        Document::Null => String::new(),
        Document::Array(_) | Document::Object(_) => {
            return Err(CodecError::encode(
                "INI",
                format!(
                    "value at [{}] {} is a {}; INI supports only section/key/value",
                    section,
                    key,
                    value.type_name()
                ),
            ))
        }
    };
    if rendered.contains('\n') {
        return Err(CodecError::encode(
            "INI",
            format!("value at [{}] {} contains a newline", section, key),
        ));
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section<const N: usize>(entries: [(&str, &str); N]) -> Document {
        Document::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), Document::from(v)))
                .collect(),
        )
    }

    #[test]
    fn decode_sections_and_keys() {
        let raw = Bytes::from_static(
            b"; comment\n[server]\nhost = example.com\nport = 8080\n\n[client]\nretries=3\n",
        );
        let document = IniCodec.decode(&raw).unwrap();

        let expected = Document::Object(
            [
                (
                    "server".to_string(),
                    section([("host", "example.com"), ("port", "8080")]),
                ),
                ("client".to_string(), section([("retries", "3")])),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(document, expected);
    }

    #[test]
    fn round_trip_is_stable() {
        let raw = Bytes::from_static(b"[server]\nhost = example.com\nport = 8080\n");
        let once = IniCodec.decode(&raw).unwrap();
        let encoded = IniCodec.encode(&once).unwrap();
        let twice = IniCodec.decode(&encoded).unwrap();
        assert_eq!(once, twice);

        // Our own output re-encodes byte-identically.
        assert_eq!(IniCodec.encode(&twice).unwrap(), encoded);
    }

    #[test]
    fn empty_section_survives() {
        let raw = Bytes::from_static(b"[empty]\n");
        let document = IniCodec.decode(&raw).unwrap();
        assert_eq!(
            document,
            Document::Object(
                [("empty".to_string(), Document::object())].into_iter().collect()
            )
        );
    }

    #[test]
    fn property_outside_section_is_rejected() {
        let raw = Bytes::from_static(b"orphan = value\n[section]\n");
        assert!(matches!(
            IniCodec.decode(&raw),
            Err(CodecError::Decode { .. })
        ));
    }

    #[test]
    fn garbage_line_is_rejected() {
        let raw = Bytes::from_static(b"[section]\nnot a pair\n");
        assert!(matches!(
            IniCodec.decode(&raw),
            Err(CodecError::Decode { .. })
        ));
    }

    #[test]
    fn unterminated_header_is_rejected() {
        let raw = Bytes::from_static(b"[section\nkey = value\n");
        assert!(matches!(
            IniCodec.decode(&raw),
            Err(CodecError::Decode { .. })
        ));
    }

    #[test]
    fn nested_value_fails_fast_on_encode() {
        let nested = Document::Object(
            [(
                "section".to_string(),
                Document::Object(
                    [("key".to_string(), Document::object())].into_iter().collect(),
                ),
            )]
            .into_iter()
            .collect(),
        );
        assert!(matches!(
            IniCodec.encode(&nested),
            Err(CodecError::Encode { .. })
        ));
    }

    #[test]
    fn non_object_section_fails_on_encode() {
        let flat = Document::Object(
            [("section".to_string(), Document::from("scalar"))]
                .into_iter()
                .collect(),
        );
        assert!(matches!(
            IniCodec.encode(&flat),
            Err(CodecError::Encode { .. })
        ));
    }

    #[test]
    fn scalar_values_render_without_quotes() {
        let doc = Document::Object(
            [(
                "section".to_string(),
                Document::Object(
                    [
                        ("count".to_string(), Document::Integer(3)),
                        ("enabled".to_string(), Document::Bool(true)),
                        ("blank".to_string(), Document::Null),
                    ]
                    .into_iter()
                    .collect(),
                ),
            )]
            .into_iter()
            .collect(),
        );
        let encoded = IniCodec.encode(&doc).unwrap();
        let text = std::str::from_utf8(&encoded).unwrap();
        assert!(text.contains("count = 3\n"));
        assert!(text.contains("enabled = true\n"));
        assert!(text.contains("blank = \n"));
    }
}
