//! Logging setup and the recorded build identifier.
//!
//! # Design
//! - One entry point installs the subscriber in pretty or JSON form.
//! - `RUST_LOG` takes precedence over the configured level.
//! - The build identifier is recorded only once a subscriber is installed, so run spans report
//!   the build that actually logs.

use once_cell::sync::OnceCell;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

const UNKNOWN_BUILD: &str = "dev";
const COMPILED_BUILD_SHA: Option<&str> = option_env!("FILEDATE_BUILD_SHA");

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::SubscriberInstall`] when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    install_subscriber(config)?;
    record_build_sha(config.build_sha);
    Ok(())
}

fn install_subscriber(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config.level);
    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(false))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })
}

fn record_build_sha(sha: &str) {
    if let Err(rejected) = BUILD_SHA.set(sha.to_string()) {
        warn!(recorded = build_sha(), %rejected, "build sha already recorded; keeping it");
    }
}

/// Build identifier recorded by [`init_logging`], or `dev` before logging is up.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or(UNKNOWN_BUILD, String::as_str)
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
}

impl<'a> LoggingConfig<'a> {
    /// Logging at `level` in `format`, tagged with the build this binary was compiled from.
    #[must_use]
    pub const fn new(level: &'a str, format: LogFormat) -> Self {
        let build_sha = match COMPILED_BUILD_SHA {
            Some(sha) => sha,
            None => UNKNOWN_BUILD,
        };
        Self {
            level,
            format,
            build_sha,
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
