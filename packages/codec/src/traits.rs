//! The Codec trait and built-in format selection.

use std::fmt;

use bytes::Bytes;
use confit_tree::Document;

use crate::{CodecError, IniCodec, JsonCodec, PlistCodec, XmlCodec};

/// A deserializer/serializer pair bound to one format.
///
/// Decode output must have an object or array root; the pipeline enforces
/// this and treats a scalar root from a codec as an internal defect, not a
/// user error.
///
/// # Object Safety
///
/// This trait is object-safe: the pipeline accepts `Box<dyn Codec>` for
/// caller-supplied formats.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use bytes::Bytes;
/// use confit_codec::{Codec, CodecError};
/// use confit_tree::Document;
///
/// struct UpperCaseLines;
///
/// impl Codec for UpperCaseLines {
///     fn decode(&self, raw: &Bytes) -> Result<Document, CodecError> {
///         let text = std::str::from_utf8(raw).map_err(|e| CodecError::decode("lines", e))?;
///         Ok(Document::Array(text.lines().map(Document::from).collect()))
///     }
///
///     fn encode(&self, document: &Document) -> Result<Bytes, CodecError> {
///         let Document::Array(lines) = document else {
///             return Err(CodecError::encode("lines", "expected an array of lines"));
///         };
///         let mut out = String::new();
///         for line in lines {
///             if let Document::String(s) = line {
///                 out.push_str(s);
///                 out.push('\n');
///             }
///         }
///         Ok(Bytes::from(out))
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// Parse raw content into a Document.
    fn decode(&self, raw: &Bytes) -> Result<Document, CodecError>;

    /// Render a Document back into raw content.
    fn encode(&self, document: &Document) -> Result<Bytes, CodecError>;
}

impl<T: Codec + ?Sized> Codec for Box<T> {
    fn decode(&self, raw: &Bytes) -> Result<Document, CodecError> {
        self.as_ref().decode(raw)
    }

    fn encode(&self, document: &Document) -> Result<Bytes, CodecError> {
        self.as_ref().encode(document)
    }
}

/// The closed set of built-in config formats.
///
/// Mutually exclusive with a caller-supplied codec: pipeline requests carry
/// either a `ConfigType` or a custom `Codec`, never both.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ConfigType {
    Json,
    Ini,
    Xml,
    Plist,
}

impl ConfigType {
    /// The built-in codec for this format.
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            ConfigType::Json => &JsonCodec,
            ConfigType::Ini => &IniCodec,
            ConfigType::Xml => &XmlCodec,
            ConfigType::Plist => &PlistCodec,
        }
    }

    /// Upper-case format name, as used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ConfigType::Json => "JSON",
            ConfigType::Ini => "INI",
            ConfigType::Xml => "XML",
            ConfigType::Plist => "PLIST",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_codecs_round_trip_an_empty_object() {
        // XML is excluded: an empty object has no root element to emit.
        for config_type in [ConfigType::Json, ConfigType::Ini, ConfigType::Plist] {
            let codec = config_type.codec();
            let encoded = codec.encode(&Document::object()).unwrap();
            let decoded = codec.decode(&encoded);
            assert!(decoded.is_ok(), "{} failed: {:?}", config_type, decoded);
        }
    }

    #[test]
    fn xml_rejects_rootless_object() {
        assert!(ConfigType::Xml.codec().encode(&Document::object()).is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(ConfigType::Json.to_string(), "JSON");
        assert_eq!(ConfigType::Plist.to_string(), "PLIST");
    }

    #[test]
    fn boxed_codec_dispatches() {
        let codec: Box<dyn Codec> = Box::new(JsonCodec);
        let encoded = codec.encode(&Document::object()).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), Document::object());
    }
}
