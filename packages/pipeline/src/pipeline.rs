//! The file-mutation state machine and its entry points.

use bytes::Bytes;
use confit_codec::{Codec, CodecError, ConfigType};
use confit_tree::Document;

use crate::{preflight, Error, FileHost, Identity};

/// Default size cap for target files, in megabytes.
///
/// The whole file is held in memory and transferred twice (read and write),
/// so the cap is deliberately small.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 2;

/// Boxed error returned by caller-supplied stages (transforms and custom
/// codec functions).
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// One file-mutation request: target path plus the knobs shared by every
/// entry point. Owned by a single invocation.
#[derive(Clone, Debug)]
pub struct ModifyRequest {
    pub path: String,
    pub backup: bool,
    pub max_file_size_mb: u64,
}

impl ModifyRequest {
    pub fn new(path: impl Into<String>) -> Self {
        ModifyRequest {
            path: path.into(),
            backup: false,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
        }
    }

    /// Snapshot the original to `{path}.bak_{timestamp}` before writing.
    pub fn with_backup(mut self) -> Self {
        self.backup = true;
        self
    }

    pub fn with_max_file_size_mb(mut self, max_file_size_mb: u64) -> Self {
        self.max_file_size_mb = max_file_size_mb;
        self
    }
}

/// Codec choice for the fluent entry point: a built-in format or a
/// caller-supplied codec, never both.
pub enum CodecSelection {
    Builtin(ConfigType),
    Custom(Box<dyn Codec>),
}

impl CodecSelection {
    /// Build a selection from optional parts, rejecting both-or-neither
    /// before any I/O happens.
    pub fn from_parts(
        config_type: Option<ConfigType>,
        custom: Option<Box<dyn Codec>>,
    ) -> Result<Self, Error> {
        match (config_type, custom) {
            (Some(config_type), None) => Ok(CodecSelection::Builtin(config_type)),
            (None, Some(codec)) => Ok(CodecSelection::Custom(codec)),
            (Some(_), Some(_)) => Err(Error::InvalidRequest {
                message: "provide either a config type or a custom codec, not both".to_string(),
            }),
            (None, None) => Err(Error::InvalidRequest {
                message: "provide either a config type or a custom codec".to_string(),
            }),
        }
    }
}

/// How one pipeline invocation ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Encoded output matched the original byte for byte; nothing was
    /// written. A success, not an error.
    NoOp,
    /// New content replaced the file. `backup` names the snapshot if one
    /// was taken first.
    Written { backup: Option<String> },
}

impl Outcome {
    /// Check whether the file was rewritten.
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Written { .. })
    }
}

/// Drives validate → fetch → decode → transform → encode → diff → write for
/// one file at a time.
///
/// The six states run strictly in order with no retries; any failure aborts
/// the invocation before anything is written. When the encoded output
/// matches the original byte for byte the outcome is [`Outcome::NoOp`], so
/// re-running an already-applied edit touches nothing.
pub struct FileMutationPipeline<H> {
    host: H,
    identity: Identity,
}

impl<H: FileHost> FileMutationPipeline<H> {
    pub fn new(host: H, identity: Identity) -> Self {
        FileMutationPipeline { host, identity }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Edit a structured config file in one of the built-in formats.
    ///
    /// The transform receives the decoded document and must return the
    /// modified document; a non-container return is a modification error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use confit_codec::ConfigType;
    /// use confit_pipeline::{FileMutationPipeline, Identity, MemoryHost, ModifyRequest};
    ///
    /// let mut host = MemoryHost::new();
    /// host.insert_file("/etc/app.json", "{\"cars\": {}}");
    ///
    /// let mut pipeline = FileMutationPipeline::new(host, Identity::new("root", ["root"]));
    /// let outcome = pipeline
    ///     .modify_structured(
    ///         &ModifyRequest::new("/etc/app.json"),
    ///         ConfigType::Json,
    ///         |doc| Ok(doc.cursor().get("cars").get("car0").set("Toyota")?),
    ///     )
    ///     .unwrap();
    /// assert!(outcome.changed());
    /// ```
    pub fn modify_structured<F>(
        &mut self,
        request: &ModifyRequest,
        config_type: ConfigType,
        transform: F,
    ) -> Result<Outcome, Error>
    where
        F: FnOnce(Document) -> Result<Document, TransformError>,
    {
        self.modify_with_codec(request, config_type.codec(), transform)
    }

    /// Edit a plain-text file: the transform maps the raw string to the new
    /// string, no document layer involved.
    pub fn modify_plaintext<F>(
        &mut self,
        request: &ModifyRequest,
        transform: F,
    ) -> Result<Outcome, Error>
    where
        F: FnOnce(String) -> Result<String, TransformError>,
    {
        let decode_path = request.path.clone();
        let transform_path = request.path.clone();
        self.run(
            request,
            move |raw| {
                std::str::from_utf8(raw)
                    .map(str::to_string)
                    .map_err(|e| Error::Deserialize {
                        path: decode_path.clone(),
                        source: CodecError::decode("text", e),
                    })
            },
            move |content| {
                transform(content).map_err(|source| Error::Modification {
                    path: transform_path.clone(),
                    source,
                })
            },
            move |content: &String| Ok(Bytes::from(content.clone())),
        )
    }

    /// Edit a file through caller-supplied deserialize/transform/serialize
    /// functions over the caller's own types.
    pub fn modify_custom<T, U, De, Tr, Ser>(
        &mut self,
        request: &ModifyRequest,
        deserialize: De,
        transform: Tr,
        serialize: Ser,
    ) -> Result<Outcome, Error>
    where
        De: FnOnce(&Bytes) -> Result<T, TransformError>,
        Tr: FnOnce(T) -> Result<U, TransformError>,
        Ser: FnOnce(&U) -> Result<Bytes, TransformError>,
    {
        let decode_path = request.path.clone();
        let transform_path = request.path.clone();
        let encode_path = request.path.clone();
        self.run(
            request,
            move |raw| {
                deserialize(raw).map_err(|e| Error::Deserialize {
                    path: decode_path.clone(),
                    source: CodecError::decode("custom", e),
                })
            },
            move |value| {
                transform(value).map_err(|source| Error::Modification {
                    path: transform_path.clone(),
                    source,
                })
            },
            move |value| {
                serialize(value).map_err(|e| Error::Serialize {
                    path: encode_path.clone(),
                    source: CodecError::encode("custom", e.to_string()),
                })
            },
        )
    }

    /// Edit a structured file with either a built-in format or a custom
    /// codec, chosen by the [`CodecSelection`].
    ///
    /// Use [`CodecSelection::from_parts`] when the choice arrives as two
    /// optional parameters; it rejects both-or-neither before any I/O.
    pub fn modify_fluent<F>(
        &mut self,
        request: &ModifyRequest,
        selection: CodecSelection,
        transform: F,
    ) -> Result<Outcome, Error>
    where
        F: FnOnce(Document) -> Result<Document, TransformError>,
    {
        match selection {
            CodecSelection::Builtin(config_type) => {
                self.modify_structured(request, config_type, transform)
            }
            CodecSelection::Custom(codec) => self.modify_with_codec(request, &codec, transform),
        }
    }

    fn modify_with_codec<F>(
        &mut self,
        request: &ModifyRequest,
        codec: &dyn Codec,
        transform: F,
    ) -> Result<Outcome, Error>
    where
        F: FnOnce(Document) -> Result<Document, TransformError>,
    {
        let decode_path = request.path.clone();
        let transform_path = request.path.clone();
        let encode_path = request.path.clone();
        self.run(
            request,
            move |raw| {
                if is_blank(raw) {
                    return Ok(Document::object());
                }
                let document = codec.decode(raw).map_err(|source| Error::Deserialize {
                    path: decode_path.clone(),
                    source,
                })?;
                if !document.is_container() {
                    return Err(Error::Invariant {
                        path: decode_path,
                        message: format!(
                            "decoded root must be an object or array, found {}",
                            document.type_name()
                        ),
                    });
                }
                Ok(document)
            },
            move |document| {
                let modified = transform(document).map_err(|source| Error::Modification {
                    path: transform_path.clone(),
                    source,
                })?;
                if !modified.is_container() {
                    return Err(Error::Modification {
                        path: transform_path,
                        source: format!(
                            "modify action must return an object or array, got {}",
                            modified.type_name()
                        )
                        .into(),
                    });
                }
                Ok(modified)
            },
            move |document| {
                codec.encode(document).map_err(|source| Error::Serialize {
                    path: encode_path.clone(),
                    source,
                })
            },
        )
    }

    /// The shared state machine. Stage closures arrive with their errors
    /// already classified per entry point.
    fn run<T, U, De, Tr, Ser>(
        &mut self,
        request: &ModifyRequest,
        decode: De,
        transform: Tr,
        encode: Ser,
    ) -> Result<Outcome, Error>
    where
        De: FnOnce(&Bytes) -> Result<T, Error>,
        Tr: FnOnce(T) -> Result<U, Error>,
        Ser: FnOnce(&U) -> Result<Bytes, Error>,
    {
        let path = request.path.as_str();

        let stat = self.host.stat(path)?;
        preflight(path, stat.as_ref(), &self.identity, request.max_file_size_mb)?;

        log::debug!("reading {}", path);
        let original = self.host.fetch(path)?.ok_or_else(|| Error::Read {
            path: path.to_string(),
        })?;

        let decoded = decode(&original)?;
        let modified = transform(decoded)?;
        let encoded = encode(&modified)?;

        if encoded == original {
            log::info!("config file {} is already up-to-date", path);
            return Ok(Outcome::NoOp);
        }

        let backup = if request.backup {
            let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
            let backup_path = format!("{}.bak_{}", path, timestamp);
            log::debug!("backing up {} to {}", path, backup_path);
            self.host.upload(&backup_path, original.clone())?;
            Some(backup_path)
        } else {
            None
        };

        log::debug!("writing {}", path);
        self.host.upload(path, encoded)?;
        Ok(Outcome::Written { backup })
    }
}

fn is_blank(raw: &Bytes) -> bool {
    std::str::from_utf8(raw)
        .map(|s| s.trim().is_empty())
        .unwrap_or(false)
}
