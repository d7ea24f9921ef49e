//! # Design
//!
//! - Only batch-level failures are errors; per-file problems live in `FileMetadata`.
//! - Keep error messages constant while carrying context fields for debugging.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for metadata extraction calls.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Failure of a whole extraction call.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The extraction tool could not be started or awaited.
    #[error("failed to invoke metadata tool")]
    Spawn {
        /// Tool binary that was invoked.
        binary: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The tool produced no output to decode.
    #[error("metadata tool produced no output")]
    EmptyOutput {
        /// Tool binary that was invoked.
        binary: PathBuf,
        /// Exit code, when the process exited normally.
        status: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },
    /// The tool output could not be decoded.
    #[error("failed to decode metadata output")]
    Decode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The tool output had an unexpected shape.
    #[error("unexpected metadata output")]
    UnexpectedOutput {
        /// Static reason for the rejection.
        reason: &'static str,
    },
    /// The service is not able to serve requests.
    #[error("metadata service unavailable")]
    Unavailable {
        /// Human-readable detail.
        detail: String,
    },
}
