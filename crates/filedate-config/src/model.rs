//! Typed configuration models.
//!
//! # Design
//! - `ConfigDocument` mirrors the JSON file; `DispatcherConfig` is the validated form.
//! - Date-field rules keep their document order, which is the resolution precedence.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::validate::validate_date_fields;

/// A metadata field consulted for the capture date and the pattern its value follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFieldRule {
    /// Metadata field name, e.g. `CreateDate`.
    pub field: String,
    /// strftime pattern the field value is parsed with.
    pub pattern: String,
}

/// Ordered, validated set of date-field rules with unique field names.
///
/// Cloning is cheap; clones share the same immutable rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFieldRules {
    rules: Arc<[DateFieldRule]>,
}

impl DateFieldRules {
    /// Validate and freeze the given rules in their current order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the list is empty, a name is blank or
    /// repeated, or a pattern is not a valid strftime pattern.
    pub fn new(rules: Vec<DateFieldRule>) -> ConfigResult<Self> {
        validate_date_fields(&rules)?;
        Ok(Self {
            rules: rules.into(),
        })
    }

    /// Iterate the rules in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &DateFieldRule> {
        self.rules.iter()
    }

    /// Number of configured rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always `false` for a validated set; present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Logging verbosity accepted in the configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Most verbose output.
    Trace,
    /// Debug output, including one line per discovered file.
    Debug,
    /// Default level.
    Info,
    /// Warnings and errors only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::invalid(
                "loggingLevel",
                "unknown_level",
                Some(other),
            )),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format requested by the configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatSetting {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormatSetting {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::invalid(
                "logFormat",
                "unknown_format",
                Some(other),
            )),
        }
    }
}

/// Raw configuration document as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigDocument {
    pub(crate) logging_level: Option<String>,
    pub(crate) log_format: Option<String>,
    pub(crate) batch_size: Option<usize>,
    pub(crate) output_date_format: Option<String>,
    #[serde(default)]
    pub(crate) date_fields: Vec<DateFieldRule>,
}

/// Validated dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Logging verbosity.
    pub logging_level: LogLevel,
    /// Explicit log format; `None` lets telemetry infer one from the build.
    pub log_format: Option<LogFormatSetting>,
    /// Number of files submitted per metadata extraction call.
    pub batch_size: usize,
    /// strftime pattern used to name destination subfolders.
    pub output_date_format: String,
    /// Ordered date-field rules.
    pub date_fields: DateFieldRules,
}
