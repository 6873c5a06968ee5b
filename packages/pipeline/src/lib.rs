//! confit pipeline layer: the file-mutation state machine.
//!
//! One invocation edits one file:
//! validate → fetch → decode → transform → encode → diff →
//! {no-op | backup+write | write}.
//!
//! File access goes through the [`FileHost`] trait so the same pipeline runs
//! against a remote execution layer, the local filesystem ([`LocalHost`]),
//! or an in-memory double ([`MemoryHost`]). The acting [`Identity`] is
//! passed in explicitly; the pipeline never reads ambient process state.
//!
//! Invocations are independent and hold no shared state: drive as many in
//! parallel as the surrounding orchestrator likes, one file per invocation.
//! Re-running an unchanged edit is a successful no-op, not a write.

mod error;
mod host;
#[cfg(unix)]
mod local;
mod memory;
mod pipeline;
mod preflight;

pub use error::Error;
pub use host::{FileHost, FileStat, HostError, Identity};
#[cfg(unix)]
pub use local::{current_identity, LocalHost};
pub use memory::MemoryHost;
pub use pipeline::{
    CodecSelection, FileMutationPipeline, ModifyRequest, Outcome, TransformError,
    DEFAULT_MAX_FILE_SIZE_MB,
};
pub use preflight::preflight;
