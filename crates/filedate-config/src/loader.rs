//! Loading of the JSON configuration document.
//!
//! # Design
//! - Defaults are filled in (with a warning) before validation so logs explain the fallback.
//! - Command-line overrides win over document values and go through the same validation.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::warn;

use crate::defaults::{DEFAULT_BATCH_SIZE, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_DATE_FORMAT};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigDocument, DateFieldRules, DispatcherConfig, LogFormatSetting, LogLevel};
use crate::validate::{validate_batch_size, validate_output_pattern};

/// Values supplied on the command line that replace document settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replacement batch size.
    pub batch_size: Option<usize>,
    /// Replacement logging level.
    pub logging_level: Option<String>,
}

/// Load and validate the configuration document at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, is not valid JSON, or fails validation.
pub fn load_config(path: &Path) -> ConfigResult<DispatcherConfig> {
    load_config_with(path, &ConfigOverrides::default())
}

/// Load the document at `path`, apply `overrides`, then validate.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, is not valid JSON, or fails validation.
pub fn load_config_with(path: &Path, overrides: &ConfigOverrides) -> ConfigResult<DispatcherConfig> {
    let raw = fs::read_to_string(path).map_err(|err| ConfigError::io("read", path, err))?;
    let document: ConfigDocument =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
    build_config(document, overrides)
}

/// Parse and validate a configuration document held in memory.
///
/// # Errors
///
/// Returns [`ConfigError`] when the document is not valid JSON or fails validation.
pub fn parse_config(raw: &str, overrides: &ConfigOverrides) -> ConfigResult<DispatcherConfig> {
    let document: ConfigDocument =
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse { path: None, source })?;
    build_config(document, overrides)
}

fn build_config(
    document: ConfigDocument,
    overrides: &ConfigOverrides,
) -> ConfigResult<DispatcherConfig> {
    let batch_size = match overrides.batch_size.or(document.batch_size) {
        Some(value) => validate_batch_size(value)?,
        None => {
            warn!(
                batch_size = DEFAULT_BATCH_SIZE,
                "no batch size specified, using default"
            );
            DEFAULT_BATCH_SIZE
        }
    };

    let level = match overrides
        .logging_level
        .as_deref()
        .or(document.logging_level.as_deref())
    {
        Some(value) => value,
        None => {
            warn!(
                level = DEFAULT_LOG_LEVEL,
                "no logging level specified, using default"
            );
            DEFAULT_LOG_LEVEL
        }
    };
    let logging_level = LogLevel::from_str(level)?;

    let log_format = document
        .log_format
        .as_deref()
        .map(LogFormatSetting::from_str)
        .transpose()?;

    let output_date_format = document
        .output_date_format
        .unwrap_or_else(|| DEFAULT_OUTPUT_DATE_FORMAT.to_string());
    validate_output_pattern(&output_date_format)?;

    let date_fields = DateFieldRules::new(document.date_fields)?;

    Ok(DispatcherConfig {
        logging_level,
        log_format,
        batch_size,
        output_date_format,
        date_fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "dateFields": [{ "field": "CreateDate", "pattern": "%Y:%m:%d %H:%M:%S" }]
    }"#;

    #[test]
    fn minimal_document_gets_defaults() -> ConfigResult<()> {
        let config = parse_config(MINIMAL, &ConfigOverrides::default())?;
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.logging_level, LogLevel::Info);
        assert_eq!(config.output_date_format, DEFAULT_OUTPUT_DATE_FORMAT);
        assert!(config.log_format.is_none());
        assert_eq!(config.date_fields.len(), 1);
        Ok(())
    }

    #[test]
    fn overrides_replace_document_values() -> ConfigResult<()> {
        let raw = r#"{
            "loggingLevel": "warn",
            "batchSize": 50,
            "dateFields": [{ "field": "CreateDate", "pattern": "%Y" }]
        }"#;
        let overrides = ConfigOverrides {
            batch_size: Some(2),
            logging_level: Some("debug".to_string()),
        };
        let config = parse_config(raw, &overrides)?;
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.logging_level, LogLevel::Debug);
        Ok(())
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let raw = r#"{ "batchSize": 0, "dateFields": [{ "field": "CreateDate", "pattern": "%Y" }] }"#;
        let err = parse_config(raw, &ConfigOverrides::default()).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "batchSize",
                ..
            })
        ));
    }

    #[test]
    fn negative_batch_size_fails_to_parse() {
        let raw = r#"{ "batchSize": -1, "dateFields": [{ "field": "CreateDate", "pattern": "%Y" }] }"#;
        let err = parse_config(raw, &ConfigOverrides::default()).err();
        assert!(matches!(err, Some(ConfigError::Parse { .. })));
    }

    #[test]
    fn empty_date_fields_are_rejected() {
        let err = parse_config("{}", &ConfigOverrides::default()).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "dateFields",
                reason: "empty",
                ..
            })
        ));
    }

    #[test]
    fn unknown_logging_level_is_rejected() {
        let overrides = ConfigOverrides {
            batch_size: None,
            logging_level: Some("b".to_string()),
        };
        let err = parse_config(MINIMAL, &overrides).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "loggingLevel",
                ..
            })
        ));
    }
}
