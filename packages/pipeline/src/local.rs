//! Local-filesystem host (unix).

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::os::unix::fs::PermissionsExt;

use bytes::Bytes;

use crate::{FileHost, FileStat, HostError, Identity};

/// [`FileHost`] over the local filesystem.
///
/// Owner and group are reported as numeric-id strings; pair it with
/// [`current_identity`], which uses the same convention, so the permission
/// preflight compares like with like.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalHost;

impl LocalHost {
    pub fn new() -> Self {
        LocalHost
    }
}

/// Identity of the current process: uid and gids as numeric strings.
pub fn current_identity() -> Result<Identity, HostError> {
    let user = nix::unistd::getuid().as_raw().to_string();
    let mut groups: Vec<String> = nix::unistd::getgroups()
        .map_err(|e| HostError::Other {
            message: format!("cannot list supplementary groups: {}", e),
        })?
        .into_iter()
        .map(|gid| gid.as_raw().to_string())
        .collect();

    let primary = nix::unistd::getgid().as_raw().to_string();
    if !groups.contains(&primary) {
        groups.push(primary);
    }
    Ok(Identity { user, groups })
}

fn io_error(path: &str, source: io::Error) -> HostError {
    HostError::Io {
        path: path.to_string(),
        source,
    }
}

impl FileHost for LocalHost {
    fn stat(&mut self, path: &str) -> Result<Option<FileStat>, HostError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };

        let bits = metadata.permissions().mode();
        let mode = ((bits >> 6) & 0o7) * 100 + ((bits >> 3) & 0o7) * 10 + (bits & 0o7);

        Ok(Some(FileStat {
            is_file: metadata.is_file(),
            size_bytes: metadata.len(),
            mode,
            owner: metadata.uid().to_string(),
            group: metadata.gid().to_string(),
        }))
    }

    fn fetch(&mut self, path: &str) -> Result<Option<Bytes>, HostError> {
        match fs::read(path) {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, e)),
        }
    }

    fn upload(&mut self, path: &str, content: Bytes) -> Result<(), HostError> {
        fs::write(path, &content).map_err(|e| io_error(path, e))
    }
}
