//! Path-addressed, copy-on-write editing of Documents.

use crate::{DocPath, Document, EditError, Step};

/// One modification step in a chain: takes the current document, returns
/// the next one.
pub type ChainStep = Box<dyn FnOnce(Document) -> Result<Document, EditError>>;

/// A path paired with a private working copy of a root Document.
///
/// Descending with [`get`](TreeCursor::get) only records steps and never
/// fails. The terminal operations (`set`, `append`, `remove`) walk the
/// recorded path against the working copy and return the **entire mutated
/// root**, never the sub-value; chained edits rebind "current document" to
/// each step's return value. The document the cursor was created from is
/// never touched.
///
/// Missing structure along the way is handled per step kind:
/// - string keys auto-vivify empty objects (transitively),
/// - indexes never auto-vivify; indexing anything but an existing array
///   element is a path error. Arrays come into existence only via `append`.
///
/// # Example
///
/// ```rust
/// use confit_tree::Document;
///
/// let doc = Document::object();
/// let doc = doc.cursor().get("cars").get("car0").set("Toyota").unwrap();
/// let doc = doc.cursor().get("passengers").append("Alice").unwrap();
/// assert!(doc.get(&["cars", "car0"].into_iter().collect()).is_some());
/// ```
pub struct TreeCursor {
    root: Document,
    path: DocPath,
}

impl Document {
    /// Begin editing through a cursor over a private copy of `self`.
    pub fn cursor(&self) -> TreeCursor {
        TreeCursor {
            root: self.clone(),
            path: DocPath::root(),
        }
    }

    /// Thread `self` through each chain step strictly in order.
    ///
    /// Step *i+1* receives exactly the document step *i* returned; the first
    /// failing step aborts the chain.
    pub fn modify_chained<I>(self, chain: I) -> Result<Document, EditError>
    where
        I: IntoIterator<Item = ChainStep>,
    {
        chain.into_iter().try_fold(self, |doc, step| step(doc))
    }
}

impl TreeCursor {
    /// Descend one step. Never fails; missing or incompatible structure is
    /// reported by the terminal operation.
    #[must_use]
    pub fn get(mut self, step: impl Into<Step>) -> TreeCursor {
        self.path.push(step.into());
        self
    }

    /// The path recorded so far.
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Write `value` at the cursor's path and return the new root.
    ///
    /// Intermediate objects are created for missing keys along the path.
    pub fn set(self, value: impl Into<Document>) -> Result<Document, EditError> {
        let TreeCursor { mut root, path } = self;
        let value = value.into();

        let Some((last, parents)) = path.steps().split_last() else {
            return Ok(value);
        };

        let parent = ensure_path(&mut root, parents, &path)?;
        match (parent, last) {
            (Document::Object(map), Step::Key(key)) => {
                map.insert(key.clone(), value);
            }
            (Document::Array(arr), Step::Index(index)) => {
                let len = arr.len();
                match arr.get_mut(*index) {
                    Some(slot) => *slot = value,
                    None => {
                        return Err(EditError::path(
                            &path,
                            format!("array index {} out of bounds (len {})", index, len),
                        ))
                    }
                }
            }
            (Document::Object(_), Step::Index(index)) => {
                return Err(EditError::path(
                    &path,
                    format!("index {} into non-array (object)", index),
                ))
            }
            (Document::Array(_), Step::Key(_)) => {
                return Err(EditError::type_mismatch(&path, "object", "array"))
            }
            (other, _) => {
                return Err(EditError::path(
                    &path,
                    format!("cannot set below {}", other.type_name()),
                ))
            }
        }
        Ok(root)
    }

    /// Append `value` to the array at the cursor's path and return the new
    /// root.
    ///
    /// An absent location becomes a fresh one-element array; an existing
    /// non-array is a type mismatch.
    pub fn append(self, value: impl Into<Document>) -> Result<Document, EditError> {
        let TreeCursor { mut root, path } = self;
        let value = value.into();

        let Some((last, parents)) = path.steps().split_last() else {
            match &mut root {
                Document::Array(arr) => {
                    arr.push(value);
                    return Ok(root);
                }
                other => {
                    return Err(EditError::type_mismatch(&path, "array", other.type_name()))
                }
            }
        };

        let parent = ensure_path(&mut root, parents, &path)?;
        match (parent, last) {
            (Document::Object(map), Step::Key(key)) => {
                match map.entry(key.clone()).or_insert_with(Document::array) {
                    Document::Array(arr) => arr.push(value),
                    other => {
                        return Err(EditError::type_mismatch(&path, "array", other.type_name()))
                    }
                }
            }
            (Document::Array(arr), Step::Index(index)) => {
                let len = arr.len();
                match arr.get_mut(*index) {
                    Some(Document::Array(inner)) => inner.push(value),
                    Some(other) => {
                        return Err(EditError::type_mismatch(&path, "array", other.type_name()))
                    }
                    None => {
                        return Err(EditError::path(
                            &path,
                            format!("array index {} out of bounds (len {})", index, len),
                        ))
                    }
                }
            }
            (Document::Object(_), Step::Index(index)) => {
                return Err(EditError::path(
                    &path,
                    format!("index {} into non-array (object)", index),
                ))
            }
            (Document::Array(_), Step::Key(_)) => {
                return Err(EditError::type_mismatch(&path, "object", "array"))
            }
            (other, _) => {
                return Err(EditError::path(
                    &path,
                    format!("cannot append below {}", other.type_name()),
                ))
            }
        }
        Ok(root)
    }

    /// Delete the key or index at the cursor's path and return the new root.
    ///
    /// The parent container stays in place, possibly empty. Removing a
    /// missing key or index is a path error.
    pub fn remove(self) -> Result<Document, EditError> {
        let TreeCursor { mut root, path } = self;

        let Some((last, parents)) = path.steps().split_last() else {
            return Err(EditError::path(&path, "cannot remove the document root"));
        };

        let parent = resolve_path(&mut root, parents, &path)?;
        match (parent, last) {
            (Document::Object(map), Step::Key(key)) => {
                if map.remove(key).is_none() {
                    return Err(EditError::path(
                        &path,
                        format!("cannot remove missing key '{}'", key),
                    ));
                }
            }
            (Document::Array(arr), Step::Index(index)) => {
                if *index >= arr.len() {
                    return Err(EditError::path(
                        &path,
                        format!("array index {} out of bounds (len {})", index, arr.len()),
                    ));
                }
                arr.remove(*index);
            }
            (Document::Object(_), Step::Index(index)) => {
                return Err(EditError::path(
                    &path,
                    format!("index {} into non-array (object)", index),
                ))
            }
            (Document::Array(_), Step::Key(_)) => {
                return Err(EditError::type_mismatch(&path, "object", "array"))
            }
            (other, _) => {
                return Err(EditError::path(
                    &path,
                    format!("cannot remove below {}", other.type_name()),
                ))
            }
        }
        Ok(root)
    }
}

/// Walk `steps`, auto-vivifying empty objects for missing keys, and return
/// the node they land on.
fn ensure_path<'a>(
    root: &'a mut Document,
    steps: &[Step],
    full: &DocPath,
) -> Result<&'a mut Document, EditError> {
    let mut current = root;
    for step in steps {
        current = match step {
            Step::Key(key) => match current {
                Document::Object(map) => {
                    map.entry(key.clone()).or_insert_with(Document::object)
                }
                other => {
                    return Err(EditError::path(
                        full,
                        format!("cannot descend by key '{}' into {}", key, other.type_name()),
                    ))
                }
            },
            Step::Index(index) => match current {
                Document::Array(arr) => {
                    let len = arr.len();
                    arr.get_mut(*index).ok_or_else(|| {
                        EditError::path(
                            full,
                            format!("array index {} out of bounds (len {})", index, len),
                        )
                    })?
                }
                other => {
                    return Err(EditError::path(
                        full,
                        format!("index {} into non-array ({})", index, other.type_name()),
                    ))
                }
            },
        };
    }
    Ok(current)
}

/// Walk `steps` strictly: no auto-vivification, missing structure is a path
/// error.
fn resolve_path<'a>(
    root: &'a mut Document,
    steps: &[Step],
    full: &DocPath,
) -> Result<&'a mut Document, EditError> {
    let mut current = root;
    for step in steps {
        current = match step {
            Step::Key(key) => match current {
                Document::Object(map) => map.get_mut(key).ok_or_else(|| {
                    EditError::path(full, format!("missing key '{}'", key))
                })?,
                other => {
                    return Err(EditError::path(
                        full,
                        format!("cannot descend by key '{}' into {}", key, other.type_name()),
                    ))
                }
            },
            Step::Index(index) => match current {
                Document::Array(arr) => {
                    let len = arr.len();
                    arr.get_mut(*index).ok_or_else(|| {
                        EditError::path(
                            full,
                            format!("array index {} out of bounds (len {})", index, len),
                        )
                    })?
                }
                other => {
                    return Err(EditError::path(
                        full,
                        format!("index {} into non-array ({})", index, other.type_name()),
                    ))
                }
            },
        };
    }
    Ok(current)
}
