//! The Document type - the tree every codec and cursor operates on.

use std::collections::BTreeMap;

use crate::{DocPath, Step};

/// A tree-shaped value decoded from (or encoded into) a config file.
///
/// This is the universal data representation in confit. It maps directly to
/// JSON, INI sections, XML element trees, and property lists, but is
/// format-agnostic.
///
/// # Design Notes
///
/// - Uses `BTreeMap` for deterministic ordering (important for byte-stable
///   re-encoding and comparison)
/// - Uses `i64` for integers (sufficient for config data)
/// - The root of any decoded or transformed document must be an `Object` or
///   an `Array`; scalar roots are rejected by the pipeline
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Document {
    /// Absence of a value. Distinct from "path doesn't exist".
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Document>),
    /// Key-value map with string keys.
    Object(BTreeMap<String, Document>),
}

impl Document {
    /// Create an empty object.
    pub fn object() -> Self {
        Document::Object(BTreeMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Document::Array(Vec::new())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    /// Check if this value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Document::Object(_))
    }

    /// Check if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Document::Array(_))
    }

    /// Check if this value is an object or an array.
    pub fn is_container(&self) -> bool {
        matches!(self, Document::Object(_) | Document::Array(_))
    }

    /// Short name of this value's shape, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Integer(_) => "integer",
            Document::Float(_) => "float",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }

    /// Get a reference to a nested value by path.
    ///
    /// Returns `None` if the path doesn't exist or can't be navigated
    /// (e.g., indexing into a string). Read-only: no auto-vivification.
    pub fn get(&self, path: &DocPath) -> Option<&Document> {
        let mut current = self;
        for step in path.steps() {
            current = match (current, step) {
                (Document::Object(map), Step::Key(key)) => map.get(key)?,
                (Document::Array(arr), Step::Index(index)) => arr.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

// Conversion from common types

impl From<bool> for Document {
    fn from(v: bool) -> Self {
        Document::Bool(v)
    }
}

impl From<i64> for Document {
    fn from(v: i64) -> Self {
        Document::Integer(v)
    }
}

impl From<i32> for Document {
    fn from(v: i32) -> Self {
        Document::Integer(v as i64)
    }
}

impl From<f64> for Document {
    fn from(v: f64) -> Self {
        Document::Float(v)
    }
}

impl From<String> for Document {
    fn from(v: String) -> Self {
        Document::String(v)
    }
}

impl From<&str> for Document {
    fn from(v: &str) -> Self {
        Document::String(v.to_string())
    }
}

impl<T: Into<Document>> From<Vec<T>> for Document {
    fn from(v: Vec<T>) -> Self {
        Document::Array(v.into_iter().map(Into::into).collect())
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
    fn get_nested_value() {
        let doc = obj([("foo", obj([("bar", Document::from("hello"))]))]);

        let path = DocPath::root().join("foo").join("bar");
        assert_eq!(doc.get(&path), Some(&Document::from("hello")));
        assert_eq!(doc.get(&DocPath::root().join("nonexistent")), None);
    }

    #[test]
    fn get_array_element() {
        let doc = obj([("items", Document::from(vec!["a", "b", "c"]))]);

        assert_eq!(
            doc.get(&DocPath::root().join("items").join(1usize)),
            Some(&Document::from("b"))
        );
        assert_eq!(doc.get(&DocPath::root().join("items").join(3usize)), None);
    }

    #[test]
    fn get_rejects_mismatched_steps() {
        let doc = obj([("name", Document::from("Toyota"))]);

        // Indexing into an object, keying into a scalar: both miss.
        assert_eq!(doc.get(&DocPath::root().join(0usize)), None);
        assert_eq!(doc.get(&DocPath::root().join("name").join("deeper")), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(Document::Null.type_name(), "null");
        assert_eq!(Document::from(1i64).type_name(), "integer");
        assert_eq!(Document::from(1.5).type_name(), "float");
        assert_eq!(Document::object().type_name(), "object");
        assert_eq!(Document::array().type_name(), "array");
    }

    #[test]
    fn default_is_null() {
        assert!(Document::default().is_null());
    }

    #[test]
    fn container_checks() {
        assert!(Document::object().is_container());
        assert!(Document::array().is_container());
        assert!(!Document::from("x").is_container());
        assert!(!Document::Null.is_container());
    }
}
