//! Pipeline errors.

use confit_codec::CodecError;

use crate::HostError;

/// Failure modes of a single pipeline invocation.
///
/// Every variant is fatal to the invocation: nothing downstream of the
/// failing state runs, and no partial write ever occurs. The first four are
/// preflight failures, reported before any content is transferred.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Preflight: nothing exists at the target path.
    #[error("config file {path} not found")]
    NotFound { path: String },

    /// Preflight: the target exists but is not a regular file.
    #[error("config file {path} is not a file")]
    NotAFile { path: String },

    /// Preflight: the target exceeds the configured size cap.
    #[error(
        "config file {path} is too large to process: {size_bytes} bytes (cap {max_file_size_mb} MB)"
    )]
    TooLarge {
        path: String,
        size_bytes: u64,
        max_file_size_mb: u64,
    },

    /// Preflight: the acting identity cannot both read and write the target.
    #[error("config file {path} is not readable/writable by {user}")]
    Permission { path: String, user: String },

    /// The host reported the file during preflight but returned no content.
    /// A collaborator contract violation, not a user input error.
    #[error("failed to read config file {path}")]
    Read { path: String },

    /// The fetched content is malformed for the declared format.
    #[error("cannot deserialize {path}: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: CodecError,
    },

    /// The transform failed, or returned a value of the wrong shape.
    #[error("modify action failed for {path}: {source}")]
    Modification {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The transformed value could not be rendered back to raw content.
    #[error("cannot serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: CodecError,
    },

    /// An internal contract was broken (e.g. a decoder produced a scalar
    /// root). This is a defect report, not a usage mistake.
    #[error("invariant violation on {path}: {message}; this is not supposed to happen, report a bug")]
    Invariant { path: String, message: String },

    /// The request itself is unusable, reported before any I/O.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Transport failure in the host collaborator.
    #[error("host failure: {0}")]
    Host(#[from] HostError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_messages_carry_the_path() {
        let err = Error::NotFound {
            path: "/etc/app.json".to_string(),
        };
        assert_eq!(err.to_string(), "config file /etc/app.json not found");

        let err = Error::TooLarge {
            path: "/etc/app.json".to_string(),
            size_bytes: 3 * 1024 * 1024,
            max_file_size_mb: 2,
        };
        let display = err.to_string();
        assert!(display.contains("too large"));
        assert!(display.contains("3145728"));
        assert!(display.contains("2 MB"));
    }

    #[test]
    fn deserialize_keeps_the_cause() {
        use std::error::Error as _;
        let err = Error::Deserialize {
            path: "/etc/app.json".to_string(),
            source: CodecError::decode("JSON", "bad token"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/etc/app.json"));
    }

    #[test]
    fn host_error_converts() {
        let err: Error = HostError::Other {
            message: "connection dropped".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Host(_)));
    }
}
