//! Validation helpers and parsing utilities for configuration documents.

use std::collections::HashSet;
use std::path::{Component, Path};

use chrono::format::{Item, StrftimeItems};

use crate::error::{ConfigError, ConfigResult};
use crate::model::DateFieldRule;

/// Reject a zero batch size.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when `value` is zero.
pub fn validate_batch_size(value: usize) -> ConfigResult<usize> {
    if value == 0 {
        return Err(ConfigError::invalid(
            "batchSize",
            "must_be_positive",
            Some(value.to_string()),
        ));
    }
    Ok(value)
}

/// Check that `pattern` is a non-empty strftime pattern chrono can interpret.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] tagged with `field` when the pattern is blank or
/// contains an unknown specifier.
pub fn validate_date_pattern(field: &'static str, pattern: &str) -> ConfigResult<()> {
    if pattern.trim().is_empty() {
        return Err(ConfigError::invalid(field, "empty", Some(pattern)));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::invalid(field, "invalid_pattern", Some(pattern)));
    }
    Ok(())
}

/// Validate the pattern used to name destination subfolders.
///
/// The rendered name is joined onto the destination root, so it must stay relative and may not
/// climb out of it with `..`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the pattern is invalid, renders a rooted path, or
/// contains a parent-directory component.
pub fn validate_output_pattern(pattern: &str) -> ConfigResult<()> {
    validate_date_pattern("outputDateFormat", pattern)?;
    for component in Path::new(pattern).components() {
        let reason = match component {
            Component::RootDir | Component::Prefix(_) => "must_be_relative",
            Component::ParentDir => "escapes_destination",
            Component::CurDir | Component::Normal(_) => continue,
        };
        return Err(ConfigError::invalid("outputDateFormat", reason, Some(pattern)));
    }
    Ok(())
}

/// Validate the ordered date-field rules: non-empty, unique non-blank names, valid patterns.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first rule that fails validation.
pub fn validate_date_fields(rules: &[DateFieldRule]) -> ConfigResult<()> {
    if rules.is_empty() {
        return Err(ConfigError::invalid("dateFields", "empty", None::<String>));
    }

    let mut seen = HashSet::with_capacity(rules.len());
    for rule in rules {
        if rule.field.trim().is_empty() {
            return Err(ConfigError::invalid(
                "dateFields.field",
                "empty",
                Some(rule.field.as_str()),
            ));
        }
        if !seen.insert(rule.field.as_str()) {
            return Err(ConfigError::invalid(
                "dateFields.field",
                "duplicate",
                Some(rule.field.as_str()),
            ));
        }
        validate_date_pattern("dateFields.pattern", &rule.pattern)?;
    }
    Ok(())
}
