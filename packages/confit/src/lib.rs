//! confit: edit structured config files in place, safely and idempotently.
//!
//! A config edit is expressed as a transform over a decoded [`Document`]
//! (or a raw string, for plain text) and driven through a fixed pipeline:
//! validate → fetch → decode → transform → encode → diff → write. Nothing
//! is written when the encoded result matches the original, so edits are
//! safe to re-run.
//!
//! # Example
//!
//! ```rust
//! use confit::{ConfigType, FileMutationPipeline, Identity, MemoryHost, ModifyRequest};
//!
//! let mut host = MemoryHost::new();
//! host.insert_file("/etc/app.json", r#"{"cars": {"car0": {"name": "Toyota"}}}"#);
//!
//! let mut pipeline = FileMutationPipeline::new(host, Identity::new("root", ["root"]));
//! let outcome = pipeline
//!     .modify_structured(
//!         &ModifyRequest::new("/etc/app.json"),
//!         ConfigType::Json,
//!         |doc| Ok(doc.cursor().get("cars").get("car0").get("name").set("Mercedes")?),
//!     )
//!     .unwrap();
//! assert!(outcome.changed());
//! ```

pub use confit_tree::{ChainStep, DocPath, Document, EditError, Step, TreeCursor};

pub use confit_codec::{
    document_to_json, from_document, json_to_document, to_document, Codec, CodecError,
    ConfigType, IniCodec, JsonCodec, PlistCodec, XmlCodec,
};

#[cfg(unix)]
pub use confit_pipeline::{current_identity, LocalHost};
pub use confit_pipeline::{
    preflight, CodecSelection, Error, FileHost, FileMutationPipeline, FileStat, HostError,
    Identity, MemoryHost, ModifyRequest, Outcome, TransformError, DEFAULT_MAX_FILE_SIZE_MB,
};
