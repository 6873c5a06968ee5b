//! In-memory host for tests and dry runs.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::{FileHost, FileStat, HostError};

/// An in-memory path → file map implementing [`FileHost`].
///
/// Files inserted without explicit metadata get mode 644, owner and group
/// `root`. Uploads to new paths do the same, so a pipeline run against a
/// `MemoryHost` behaves like a root session on a permissive box.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use confit_pipeline::{FileHost, MemoryHost};
///
/// let mut host = MemoryHost::new();
/// host.insert_file("/etc/app.json", "{}");
/// assert_eq!(host.fetch("/etc/app.json").unwrap(), Some(Bytes::from_static(b"{}")));
/// ```
#[derive(Default)]
pub struct MemoryHost {
    entries: BTreeMap<String, MemoryEntry>,
}

#[derive(Clone)]
struct MemoryEntry {
    content: Bytes,
    is_file: bool,
    mode: u32,
    owner: String,
    group: String,
}

impl MemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file with mode 644, owned by root:root.
    pub fn insert_file(&mut self, path: &str, content: impl Into<Bytes>) {
        self.insert_file_with(path, content, 644, "root", "root");
    }

    /// Add a regular file with explicit mode and ownership.
    pub fn insert_file_with(
        &mut self,
        path: &str,
        content: impl Into<Bytes>,
        mode: u32,
        owner: &str,
        group: &str,
    ) {
        self.entries.insert(
            path.to_string(),
            MemoryEntry {
                content: content.into(),
                is_file: true,
                mode,
                owner: owner.to_string(),
                group: group.to_string(),
            },
        );
    }

    /// Add a directory entry (stat reports a non-file, fetch reports absent).
    pub fn insert_dir(&mut self, path: &str) {
        self.entries.insert(
            path.to_string(),
            MemoryEntry {
                content: Bytes::new(),
                is_file: false,
                mode: 755,
                owner: "root".to_string(),
                group: "root".to_string(),
            },
        );
    }

    /// Content currently stored at `path`.
    pub fn content(&self, path: &str) -> Option<&Bytes> {
        self.entries
            .get(path)
            .filter(|entry| entry.is_file)
            .map(|entry| &entry.content)
    }

    /// All stored paths, in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FileHost for MemoryHost {
    fn stat(&mut self, path: &str) -> Result<Option<FileStat>, HostError> {
        Ok(self.entries.get(path).map(|entry| FileStat {
            is_file: entry.is_file,
            size_bytes: entry.content.len() as u64,
            mode: entry.mode,
            owner: entry.owner.clone(),
            group: entry.group.clone(),
        }))
    }

    fn fetch(&mut self, path: &str) -> Result<Option<Bytes>, HostError> {
        Ok(self
            .entries
            .get(path)
            .filter(|entry| entry.is_file)
            .map(|entry| entry.content.clone()))
    }

    fn upload(&mut self, path: &str, content: Bytes) -> Result<(), HostError> {
        match self.entries.get_mut(path) {
            Some(entry) if entry.is_file => entry.content = content,
            Some(_) => {
                return Err(HostError::Other {
                    message: format!("cannot upload over directory {}", path),
                })
            }
            None => self.insert_file(path, content),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_reflects_inserted_metadata() {
        let mut host = MemoryHost::new();
        host.insert_file_with("/etc/app.ini", "[a]\n", 600, "alice", "staff");

        let stat = host.stat("/etc/app.ini").unwrap().unwrap();
        assert!(stat.is_file);
        assert_eq!(stat.size_bytes, 4);
        assert_eq!(stat.mode, 600);
        assert_eq!(stat.owner, "alice");
        assert_eq!(stat.group, "staff");
    }

    #[test]
    fn missing_path_is_none() {
        let mut host = MemoryHost::new();
        assert!(host.stat("/nope").unwrap().is_none());
        assert!(host.fetch("/nope").unwrap().is_none());
    }

    #[test]
    fn directories_have_no_content() {
        let mut host = MemoryHost::new();
        host.insert_dir("/etc");
        let stat = host.stat("/etc").unwrap().unwrap();
        assert!(!stat.is_file);
        assert!(host.fetch("/etc").unwrap().is_none());
        assert!(host.upload("/etc", Bytes::from_static(b"x")).is_err());
    }

    #[test]
    fn upload_overwrites_and_creates() {
        let mut host = MemoryHost::new();
        host.insert_file("/a", "old");
        host.upload("/a", Bytes::from_static(b"new")).unwrap();
        host.upload("/b", Bytes::from_static(b"fresh")).unwrap();

        assert_eq!(host.content("/a"), Some(&Bytes::from_static(b"new")));
        assert_eq!(host.content("/b"), Some(&Bytes::from_static(b"fresh")));
        assert_eq!(host.paths().collect::<Vec<_>>(), vec!["/a", "/b"]);
    }
}
