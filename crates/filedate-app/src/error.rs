//! # Design
//!
//! - Centralize application-level errors for argument parsing, bootstrap and the run itself.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Exit status is coarse: `1` for configuration problems, `2` for execution failures.

use std::error::Error as _;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Exit status for invalid arguments, configuration or roots.
pub const EXIT_CONFIGURATION: i32 = 1;
/// Exit status for failures once the run is under way.
pub const EXIT_EXECUTION: i32 = 2;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Command-line arguments were rejected.
    #[error("invalid command line")]
    Cli {
        /// Source clap error.
        source: clap::Error,
    },
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: filedate_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: filedate_telemetry::TelemetryError,
    },
    /// Dispatch pipeline failed.
    #[error("dispatch failed")]
    Pipeline {
        /// Operation identifier.
        operation: &'static str,
        /// Source pipeline error.
        source: filedate_pipeline::PipelineError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: filedate_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: filedate_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn pipeline(
        operation: &'static str,
        source: filedate_pipeline::PipelineError,
    ) -> Self {
        Self::Pipeline { operation, source }
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Cli { .. } | Self::Config { .. } => EXIT_CONFIGURATION,
            Self::Pipeline { source, .. } if source.is_configuration() => EXIT_CONFIGURATION,
            Self::Telemetry { .. } | Self::Pipeline { .. } => EXIT_EXECUTION,
        }
    }

    /// Message and source chain on one line, for stderr.
    ///
    /// Configuration failures carry the offending field or path from [`ConfigError::detail`].
    ///
    /// [`ConfigError::detail`]: filedate_config::ConfigError::detail
    #[must_use]
    pub fn display_message(&self) -> String {
        if let Self::Config { source, .. } = self {
            return format!("{self}: {}", source.detail());
        }
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}
