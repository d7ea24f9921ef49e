//! Error types for configuration operations.
//!
//! # Design
//! - Constant messages; the offending field, reason and value travel as context.
//! - Preserve IO and JSON sources without interpolating them into the message.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration document failed.
    #[error("failed to read configuration file")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the configuration document.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration document was not valid JSON for the expected shape.
    #[error("failed to parse configuration file")]
    Parse {
        /// Path of the configuration document, when loaded from disk.
        path: Option<PathBuf>,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(
        field: &'static str,
        reason: &'static str,
        value: Option<impl Into<String>>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: value.map(Into::into),
        }
    }

    /// Render the error with its context for log output.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Io {
                operation,
                path,
                source,
            } => format!("{self} ({operation} {}): {source}", path.display()),
            Self::Parse {
                path: Some(path),
                source,
            } => format!("{self} ({}): {source}", path.display()),
            Self::Parse { path: None, source } => format!("{self}: {source}"),
            Self::InvalidField {
                field,
                reason,
                value: Some(value),
            } => format!("{self}: {field} {reason} ({value})"),
            Self::InvalidField {
                field,
                reason,
                value: None,
            } => format!("{self}: {field} {reason}"),
        }
    }
}
