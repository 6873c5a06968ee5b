//! confit codec layer: between raw file content and Documents.
//!
//! Each codec is a deserialize/serialize pair bound to one format. The
//! built-ins cover JSON, INI, XML, and Apple property lists; anything else
//! comes in through a caller-supplied [`Codec`] implementation. Plain-text
//! editing bypasses this layer entirely; the pipeline hands the raw string
//! straight to the transform.
//!
//! Raw content is `bytes::Bytes`, not `&str`: binary property lists are
//! legal input.

mod convert;
mod error;
mod ini;
mod json;
mod plist;
mod traits;
mod xml;

pub use convert::{document_to_json, from_document, json_to_document, to_document};
pub use error::CodecError;
pub use ini::IniCodec;
pub use json::JsonCodec;
pub use self::plist::PlistCodec;
pub use traits::{Codec, ConfigType};
pub use xml::XmlCodec;
