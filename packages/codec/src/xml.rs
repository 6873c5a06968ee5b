//! XML codec.
//!
//! Elements convert to a dict shape: attributes become `"@name"` keys, the
//! text of a mixed element becomes a `"#text"` key, an element holding only
//! text becomes a string, an empty element becomes null, and repeated
//! sibling elements of one name collapse into an array.
//! Encoding requires a single-key object root (the document element) and
//! emits an XML declaration plus 4-space indentation.
//!
//! Round-trips of unmodified content are structurally identical; byte
//! identity is only guaranteed for output this codec produced itself.

use std::collections::BTreeMap;

use bytes::Bytes;
use confit_tree::Document;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{Codec, CodecError};

const TEXT_KEY: &str = "#text";

/// XML codec (attribute/text-preserving dict conversion).
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl Codec for XmlCodec {
    fn decode(&self, raw: &Bytes) -> Result<Document, CodecError> {
        let mut reader = Reader::from_reader(raw.as_ref());
        let mut buf = Vec::new();
        let mut stack: Vec<PendingElement> = Vec::new();
        let mut root: Option<(String, Document)> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| CodecError::decode("XML", e))?;
            match event {
                Event::Start(start) => {
                    stack.push(PendingElement::open(&start)?);
                }
                Event::Empty(start) => {
                    let (name, document) = PendingElement::open(&start)?.finish();
                    attach(&mut stack, &mut root, name, document)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        CodecError::decode("XML", "closing tag without an open element")
                    })?;
                    let (name, document) = element.finish();
                    attach(&mut stack, &mut root, name, document)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| CodecError::decode("XML", e))?;
                    push_text(&mut stack, text.trim())?;
                }
                Event::CData(cdata) => {
                    let bytes = cdata.into_inner().into_owned();
                    let text =
                        String::from_utf8(bytes).map_err(|e| CodecError::decode("XML", e))?;
                    push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes.
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(CodecError::decode("XML", "unclosed element at end of input"));
        }
        let (name, document) =
            root.ok_or_else(|| CodecError::decode("XML", "no root element"))?;
        Ok(Document::Object([(name, document)].into_iter().collect()))
    }

    fn encode(&self, document: &Document) -> Result<Bytes, CodecError> {
        let Document::Object(map) = document else {
            return Err(CodecError::encode(
                "XML",
                format!(
                    "top level must be an object with one root element, found {}",
                    document.type_name()
                ),
            ));
        };

        let mut entries = map.iter();
        let (name, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(CodecError::encode(
                    "XML",
                    format!(
                        "XML documents need exactly one root element, found {} top-level keys",
                        map.len()
                    ),
                ))
            }
        };
        if value.is_array() {
            return Err(CodecError::encode(
                "XML",
                format!("root element <{}> cannot repeat", name),
            ));
        }

        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        write_element(&mut out, name, value, 0)?;
        Ok(Bytes::from(out))
    }
}

/// An element whose closing tag has not been seen yet.
struct PendingElement {
    name: String,
    attributes: BTreeMap<String, Document>,
    children: BTreeMap<String, Vec<Document>>,
    text: String,
}

impl PendingElement {
    fn open(start: &BytesStart) -> Result<Self, CodecError> {
        let name = String::from_utf8(start.name().as_ref().to_vec())
            .map_err(|e| CodecError::decode("XML", e))?;

        let mut attributes = BTreeMap::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| CodecError::decode("XML", e))?;
            let key = String::from_utf8(attribute.key.as_ref().to_vec())
                .map_err(|e| CodecError::decode("XML", e))?;
            let value = attribute
                .unescape_value()
                .map_err(|e| CodecError::decode("XML", e))?;
            attributes.insert(format!("@{}", key), Document::String(value.into_owned()));
        }

        Ok(PendingElement {
            name,
            attributes,
            children: BTreeMap::new(),
            text: String::new(),
        })
    }

    fn finish(self) -> (String, Document) {
        let PendingElement {
            name,
            attributes,
            children,
            text,
        } = self;

        if attributes.is_empty() && children.is_empty() {
            if text.is_empty() {
                return (name, Document::Null);
            }
            return (name, Document::String(text));
        }

        let mut map = attributes;
        for (child_name, mut documents) in children {
            let document = if documents.len() == 1 {
                documents.remove(0)
            } else {
                Document::Array(documents)
            };
            map.insert(child_name, document);
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Document::String(text));
        }
        (name, Document::Object(map))
    }
}

fn attach(
    stack: &mut [PendingElement],
    root: &mut Option<(String, Document)>,
    name: String,
    document: Document,
) -> Result<(), CodecError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.entry(name).or_default().push(document);
        return Ok(());
    }
    if root.is_some() {
        return Err(CodecError::decode("XML", "multiple root elements"));
    }
    *root = Some((name, document));
    Ok(())
}

fn push_text(stack: &mut [PendingElement], text: &str) -> Result<(), CodecError> {
    if text.is_empty() {
        return Ok(());
    }
    let Some(top) = stack.last_mut() else {
        return Err(CodecError::decode("XML", "text outside of the root element"));
    };
    if !top.text.is_empty() {
        top.text.push(' ');
    }
    top.text.push_str(text);
    Ok(())
}

fn write_element(
    out: &mut String,
    name: &str,
    value: &Document,
    depth: usize,
) -> Result<(), CodecError> {
    let indent = "    ".repeat(depth);
    match value {
        Document::Array(items) => {
            for item in items {
                write_element(out, name, item, depth)?;
            }
        }
        Document::Null => {
            out.push_str(&indent);
            out.push('<');
            out.push_str(name);
            out.push_str("/>\n");
        }
        Document::Object(map) => {
            let mut attributes: Vec<(&str, String)> = Vec::new();
            let mut text: Option<String> = None;
            let mut children: Vec<(&String, &Document)> = Vec::new();
            for (key, child) in map {
                if let Some(attribute_name) = key.strip_prefix('@') {
                    let rendered = scalar_text(child).ok_or_else(|| {
                        CodecError::encode(
                            "XML",
                            format!(
                                "attribute '{}' of <{}> must be a scalar, found {}",
                                attribute_name,
                                name,
                                child.type_name()
                            ),
                        )
                    })?;
                    attributes.push((attribute_name, rendered));
                } else if key == TEXT_KEY {
                    let rendered = scalar_text(child).ok_or_else(|| {
                        CodecError::encode(
                            "XML",
                            format!(
                                "text of <{}> must be a scalar, found {}",
                                name,
                                child.type_name()
                            ),
                        )
                    })?;
                    text = Some(rendered);
                } else {
                    children.push((key, child));
                }
            }

            out.push_str(&indent);
            out.push('<');
            out.push_str(name);
            for (attribute_name, attribute_value) in &attributes {
                out.push(' ');
                out.push_str(attribute_name);
                out.push_str("=\"");
                out.push_str(&escape(attribute_value.as_str()));
                out.push('"');
            }

            if text.is_none() && children.is_empty() {
                out.push_str("/>\n");
            } else if children.is_empty() {
                out.push('>');
                if let Some(text) = &text {
                    out.push_str(&escape(text.as_str()));
                }
                out.push_str("</");
                out.push_str(name);
                out.push_str(">\n");
            } else {
                out.push_str(">\n");
                if let Some(text) = &text {
                    out.push_str(&"    ".repeat(depth + 1));
                    out.push_str(&escape(text.as_str()));
                    out.push('\n');
                }
                for (child_name, child) in children {
                    write_element(out, child_name, child, depth + 1)?;
                }
                out.push_str(&indent);
                out.push_str("</");
                out.push_str(name);
                out.push_str(">\n");
            }
        }
        scalar => {
            let rendered = scalar_text(scalar).unwrap_or_default();
            out.push_str(&indent);
            out.push('<');
            out.push_str(name);
            out.push('>');
            out.push_str(&escape(rendered.as_str()));
            out.push_str("</");
            out.push_str(name);
            out.push_str(">\n");
        }
    }
    Ok(())
}

fn scalar_text(document: &Document) -> Option<String> {
    match document {
        Document::String(s) => Some(s.clone()),
        Document::Integer(i) => Some(i.to_string()),
        Document::Float(f) => Some(f.to_string()),
        Document::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj<const N: usize>(entries: [(&str, Document); N]) -> Document {
        Document::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn decode_text_only_element() {
        let raw = Bytes::from_static(b"<config><host>example.com</host></config>");
        let document = XmlCodec.decode(&raw).unwrap();
        assert_eq!(
            document,
            obj([("config", obj([("host", "example.com".into())]))])
        );
    }

    #[test]
    fn decode_attributes_and_text() {
        let raw = Bytes::from_static(b"<server port=\"8080\">primary</server>");
        let document = XmlCodec.decode(&raw).unwrap();
        assert_eq!(
            document,
            obj([(
                "server",
                obj([("@port", "8080".into()), ("#text", "primary".into())]),
            )])
        );
    }

    #[test]
    fn decode_repeated_siblings_as_array() {
        let raw = Bytes::from_static(b"<cars><car>Toyota</car><car>BMW</car></cars>");
        let document = XmlCodec.decode(&raw).unwrap();
        assert_eq!(
            document,
            obj([("cars", obj([("car", Document::from(vec!["Toyota", "BMW"]))]))])
        );
    }

    #[test]
    fn decode_empty_element_as_null() {
        let raw = Bytes::from_static(b"<config><flag/></config>");
        let document = XmlCodec.decode(&raw).unwrap();
        assert_eq!(document, obj([("config", obj([("flag", Document::Null)]))]));
    }

    #[test]
    fn decode_unescapes_entities() {
        let raw = Bytes::from_static(b"<v>a &lt; b &amp; c</v>");
        let document = XmlCodec.decode(&raw).unwrap();
        assert_eq!(document, obj([("v", "a < b & c".into())]));
    }

    #[test]
    fn decode_skips_declaration_and_comments() {
        let raw = Bytes::from_static(
            b"<?xml version=\"1.0\"?><!-- note --><config><a>1</a></config>",
        );
        let document = XmlCodec.decode(&raw).unwrap();
        assert_eq!(document, obj([("config", obj([("a", "1".into())]))]));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let raw = Bytes::from_static(b"<a><b></a>");
        assert!(XmlCodec.decode(&raw).is_err());
    }

    #[test]
    fn decode_rejects_text_outside_root() {
        let raw = Bytes::from_static(b"stray<config/>");
        assert!(XmlCodec.decode(&raw).is_err());
    }

    #[test]
    fn encode_requires_single_root() {
        let two_roots = obj([("a", Document::Null), ("b", Document::Null)]);
        assert!(matches!(
            XmlCodec.encode(&two_roots),
            Err(CodecError::Encode { .. })
        ));
    }

    #[test]
    fn encode_escapes_text_and_attributes() {
        let document = obj([(
            "v",
            obj([("@note", "a\"b".into()), ("#text", "x < y".into())]),
        )]);
        let encoded = XmlCodec.encode(&document).unwrap();
        let text = std::str::from_utf8(&encoded).unwrap();
        assert!(text.contains("&quot;") || text.contains("&#34;"));
        assert!(text.contains("&lt;"));
    }

    #[test]
    fn round_trip_is_structurally_identical() {
        let raw = Bytes::from_static(
            b"<fleet size=\"2\"><car year=\"2000\">Toyota</car><car year=\"2001\">BMW</car><note/></fleet>",
        );
        let once = XmlCodec.decode(&raw).unwrap();
        let encoded = XmlCodec.encode(&once).unwrap();
        let twice = XmlCodec.decode(&encoded).unwrap();
        assert_eq!(once, twice);

        // Our own output re-encodes byte-identically.
        assert_eq!(XmlCodec.encode(&twice).unwrap(), encoded);
    }

    #[test]
    fn own_output_is_indented() {
        let document = obj([("config", obj([("section", obj([("key", "value".into())]))]))]);
        let encoded = XmlCodec.encode(&document).unwrap();
        let text = std::str::from_utf8(&encoded).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<config>\n"));
        assert!(text.contains("\n    <section>\n        <key>value</key>\n    </section>\n"));
    }
}
