//! # Design
//!
//! - `PipelineError` covers run-level failures; anything it carries aborts the run.
//! - `ResolveError` and `RelocateError` describe per-file problems that are logged and skipped.
//! - Keep error messages constant while carrying context fields for debugging.

use std::io;
use std::path::PathBuf;

use filedate_config::ConfigError;
use filedate_metadata::MetadataError;
use thiserror::Error;

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures that abort a run or prevent it from starting.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dispatch options failed validation.
    #[error("invalid dispatch options")]
    Options {
        /// Source validation error.
        source: ConfigError,
    },
    /// The source or destination root is unusable.
    #[error("invalid root directory")]
    InvalidRoot {
        /// Which root was rejected (`source` or `destination`).
        field: &'static str,
        /// Machine-readable reason for the rejection.
        reason: &'static str,
        /// Offending path.
        path: PathBuf,
    },
    /// Walking the source tree failed.
    #[error("failed to walk source tree")]
    Walk {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// The metadata service failed a whole batch.
    #[error("metadata extraction failed")]
    Metadata {
        /// Number of files in the failed batch.
        files: usize,
        /// Underlying service error.
        source: MetadataError,
    },
    /// A downstream stage stopped accepting work.
    #[error("pipeline stage disconnected")]
    Disconnected {
        /// Stage whose output channel closed unexpectedly.
        stage: &'static str,
    },
    /// A stage task panicked or was aborted.
    #[error("pipeline stage terminated abnormally")]
    StageTerminated {
        /// Stage that terminated.
        stage: &'static str,
        /// Join error detail.
        detail: String,
    },
    /// The run was cancelled before completion.
    #[error("pipeline cancelled")]
    Cancelled {
        /// Stage that observed the cancellation.
        stage: &'static str,
    },
}

impl PipelineError {
    /// Whether the error stems from invalid input rather than a failed execution.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Options { .. } | Self::InvalidRoot { .. })
    }

    /// Whether the error only echoes a cancellation triggered elsewhere.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Per-file failure to derive a date from metadata.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The date field exists but does not hold a string.
    #[error("date field is not a string")]
    NotAString {
        /// Field name.
        field: String,
    },
    /// The date field value does not match the configured pattern.
    #[error("date field does not match pattern")]
    Unparseable {
        /// Field name.
        field: String,
        /// Raw field value.
        value: String,
        /// Pattern the value was parsed with.
        pattern: String,
        /// Underlying chrono error.
        source: chrono::ParseError,
    },
    /// The resolved date cannot be rendered with the output pattern.
    #[error("failed to format destination folder")]
    Format {
        /// Output pattern.
        pattern: String,
    },
}

/// Per-file failure while relocating.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// The destination subfolder could not be created.
    #[error("failed to create destination directory")]
    CreateDirectory {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The source path has no file name to reuse at the destination.
    #[error("source path has no file name")]
    MissingFileName {
        /// Source path.
        path: PathBuf,
    },
    /// A file with the same name already exists at the destination.
    #[error("destination file already exists")]
    DestinationExists {
        /// Destination path.
        path: PathBuf,
    },
    /// Copying the file contents failed; the source is untouched.
    #[error("failed to copy file")]
    Copy {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The copy finished with a different size than the source.
    #[error("copied file size mismatch")]
    Verify {
        /// Destination path.
        path: PathBuf,
        /// Source length in bytes.
        expected: u64,
        /// Bytes written.
        actual: u64,
    },
    /// The source could not be removed after a verified copy; the file now exists twice.
    #[error("failed to remove source after copy")]
    Remove {
        /// Source path left in place.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl RelocateError {
    /// Metric label describing the failure.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::CreateDirectory { .. } => "create_dir_failed",
            Self::MissingFileName { .. } => "missing_file_name",
            Self::DestinationExists { .. } => "destination_exists",
            Self::Copy { .. } => "copy_failed",
            Self::Verify { .. } => "verify_failed",
            Self::Remove { .. } => "remove_failed",
        }
    }
}
