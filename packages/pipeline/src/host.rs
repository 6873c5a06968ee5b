//! The host interface the pipeline runs against.

use bytes::Bytes;

/// Metadata for one file on the host.
///
/// `mode` is the three-digit permission form (e.g. `644`), matching what
/// remote file facts report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub size_bytes: u64,
    /// Three-digit permission mode, e.g. 644.
    pub mode: u32,
    pub owner: String,
    pub group: String,
}

/// The acting user, as an explicit value.
///
/// The pipeline never consults ambient process state; whoever drives it
/// decides which identity the permission preflight is computed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub groups: Vec<String>,
}

impl Identity {
    pub fn new(
        user: impl Into<String>,
        groups: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Identity {
            user: user.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Check membership in `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Transport failures from the host collaborator.
#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Other { message: String },
}

/// File access used by the pipeline.
///
/// One host, many files: `stat` backs the preflight, `fetch` returns the
/// full original content, and `upload` replaces the full content in one
/// write (backups are uploads to a sibling path). Absence is `Ok(None)`,
/// not an error.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn FileHost>`.
pub trait FileHost: Send {
    /// Metadata for `path`, or `None` if nothing exists there.
    fn stat(&mut self, path: &str) -> Result<Option<FileStat>, HostError>;

    /// Full content of `path`, or `None` if nothing exists there.
    fn fetch(&mut self, path: &str) -> Result<Option<Bytes>, HostError>;

    /// Replace the full content of `path`.
    fn upload(&mut self, path: &str, content: Bytes) -> Result<(), HostError>;
}

// Blanket implementations for references and boxes

impl<T: FileHost + ?Sized> FileHost for &mut T {
    fn stat(&mut self, path: &str) -> Result<Option<FileStat>, HostError> {
        (*self).stat(path)
    }

    fn fetch(&mut self, path: &str) -> Result<Option<Bytes>, HostError> {
        (*self).fetch(path)
    }

    fn upload(&mut self, path: &str, content: Bytes) -> Result<(), HostError> {
        (*self).upload(path, content)
    }
}

impl<T: FileHost + ?Sized> FileHost for Box<T> {
    fn stat(&mut self, path: &str) -> Result<Option<FileStat>, HostError> {
        self.as_mut().stat(path)
    }

    fn fetch(&mut self, path: &str) -> Result<Option<Bytes>, HostError> {
        self.as_mut().fetch(path)
    }

    fn upload(&mut self, path: &str, content: Bytes) -> Result<(), HostError> {
        self.as_mut().upload(path, content)
    }
}
