//! confit tree layer: the Document value and cursor editing.
//!
//! This layer defines the shapes every other confit crate exchanges:
//! - `Document`: a tree-shaped value (object/array/scalar)
//! - `Step` / `DocPath`: key-or-index addressing into a Document
//! - `TreeCursor`: auto-vivifying navigation with copy-on-write edits
//!
//! Codecs decode file content into a `Document`, transforms edit it through
//! cursors (or plain pattern matching), and codecs render it back out.
//!
//! # Example
//!
//! ```rust
//! use confit_tree::Document;
//!
//! let doc = Document::object();
//! let doc = doc.cursor().get("cars").set("Toyota").unwrap();
//! assert_eq!(doc.cursor().get("cars").get("brand").path().to_string(), "cars/brand");
//! ```

mod cursor;
mod document;
mod error;
mod path;

pub use cursor::{ChainStep, TreeCursor};
pub use document::Document;
pub use error::EditError;
pub use path::{DocPath, Step};
