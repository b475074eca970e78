//! Crate-wide error taxonomy.
//!
//! Read operations catch [`Error::Transport`] at their boundary and degrade
//! to empty results; write and stream-acquire operations convert it into
//! [`Error::SchedulingConflict`] or [`Error::StreamUnavailable`] so the host
//! can react to the specific condition instead of a generic fault.

use crate::backend::BackendError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Server address or port is unset. Fatal, surfaced immediately.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Version handshake mismatch. The bridge marks itself unavailable and
    /// re-attempts the handshake on the next operation.
    #[error("incompatible backend version: {0}")]
    VersionIncompatible(String),

    /// Failure talking to the backend, caught at each operation boundary.
    #[error("backend transport fault: {0}")]
    Transport(#[from] BackendError),

    /// Create/update/cancel of a timer or series timer failed.
    #[error("scheduling conflict: {0}")]
    SchedulingConflict(String),

    /// Tune or resolve failed for the named channel or recording.
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),

    /// The caller's cancellation signal fired before the remote call
    /// was acknowledged.
    #[error("operation cancelled")]
    Cancelled,

    /// Deliberately unsupported operation, distinct from a failed one.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
