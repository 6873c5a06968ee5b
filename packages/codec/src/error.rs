//! Codec errors.

/// Errors produced while decoding or encoding a document.
///
/// Neither direction is ever retried; the pipeline aborts the invocation on
/// the first failure.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The input could not be parsed as the declared format.
    #[error("error while deserializing {format}: {source}")]
    Decode {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The document could not be rendered in the declared format.
    #[error("error while serializing {format}: {message}")]
    Encode { format: String, message: String },
}

impl CodecError {
    /// Wrap a parse failure for `format`.
    pub fn decode(
        format: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CodecError::Decode {
            format: format.into(),
            source: source.into(),
        }
    }

    /// Report a serialization failure for `format`.
    pub fn encode(format: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::Encode {
            format: format.into(),
            message: message.into(),
        }
    }
}
