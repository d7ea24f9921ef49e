//! Date resolution from extracted metadata.
//!
//! # Design
//! - Rules are consulted in configured order; the first field present decides.
//! - A present but malformed field is an error, not a fallthrough to the next rule.
//! - Fields a pattern omits take their earliest value: month and day 1, midnight.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use chrono::format::{self, ParseResult, Parsed, StrftimeItems};
use filedate_config::DateFieldRules;
use filedate_metadata::FileMetadata;
use serde_json::Value;

use crate::error::ResolveError;

/// Maps a file's metadata to a capture date and a destination subfolder name.
#[derive(Debug, Clone)]
pub struct DateResolver {
    rules: DateFieldRules,
    output_pattern: String,
}

impl DateResolver {
    /// Build a resolver over validated rules and output pattern.
    #[must_use]
    pub const fn new(rules: DateFieldRules, output_pattern: String) -> Self {
        Self {
            rules,
            output_pattern,
        }
    }

    /// Return the capture date from the first configured field the file carries.
    ///
    /// `Ok(None)` means none of the configured fields is present.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the first present field is not a string or does not match
    /// its pattern.
    pub fn resolve(&self, metadata: &FileMetadata) -> Result<Option<NaiveDateTime>, ResolveError> {
        for rule in self.rules.iter() {
            let Some(value) = metadata.field(&rule.field) else {
                continue;
            };
            let Value::String(raw) = value else {
                return Err(ResolveError::NotAString {
                    field: rule.field.clone(),
                });
            };
            return parse_timestamp(raw, &rule.pattern)
                .map(Some)
                .map_err(|source| ResolveError::Unparseable {
                    field: rule.field.clone(),
                    value: raw.clone(),
                    pattern: rule.pattern.clone(),
                    source,
                });
        }
        Ok(None)
    }

    /// Render `timestamp` with the output pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Format`] when the pattern needs data a naive timestamp lacks
    /// (for example a UTC offset).
    pub fn folder_name(&self, timestamp: &NaiveDateTime) -> Result<String, ResolveError> {
        let mut rendered = String::new();
        write!(rendered, "{}", timestamp.format(&self.output_pattern)).map_err(|_| {
            ResolveError::Format {
                pattern: self.output_pattern.clone(),
            }
        })?;
        Ok(rendered)
    }

    /// Resolve the destination subfolder for `metadata`, or `None` when it has no date.
    ///
    /// # Errors
    ///
    /// Propagates [`DateResolver::resolve`] and [`DateResolver::folder_name`] failures.
    pub fn destination(&self, metadata: &FileMetadata) -> Result<Option<String>, ResolveError> {
        self.resolve(metadata)?
            .map(|timestamp| self.folder_name(&timestamp))
            .transpose()
    }
}

/// Parse `raw` with `pattern`, filling calendar and clock fields the pattern leaves out:
/// month and day default to 1, the time of day to midnight.
fn parse_timestamp(raw: &str, pattern: &str) -> ParseResult<NaiveDateTime> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, raw, StrftimeItems::new(pattern))?;
    if parsed.timestamp().is_none() {
        fill_missing_fields(&mut parsed)?;
    }
    parsed.to_naive_datetime_with_offset(0)
}

fn fill_missing_fields(parsed: &mut Parsed) -> ParseResult<()> {
    let week_based = parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if !week_based {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }
    if parsed.hour_div_12().is_none() && parsed.hour_mod_12().is_none() {
        parsed.set_hour(0)?;
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedate_config::DateFieldRule;
    use serde_json::{Map, json};

    const EXIF_PATTERN: &str = "%Y:%m:%d %H:%M:%S";

    fn resolver(rules: &[(&str, &str)], output: &str) -> Result<DateResolver, Box<dyn std::error::Error>> {
        let rules = DateFieldRules::new(
            rules
                .iter()
                .map(|(field, pattern)| DateFieldRule {
                    field: (*field).to_string(),
                    pattern: (*pattern).to_string(),
                })
                .collect(),
        )?;
        Ok(DateResolver::new(rules, output.to_string()))
    }

    fn metadata(fields: &[(&str, Value)]) -> FileMetadata {
        let mut map = Map::new();
        for (name, value) in fields {
            map.insert((*name).to_string(), value.clone());
        }
        FileMetadata::with_fields("/src/photo.jpg", map)
    }

    #[test]
    fn create_date_lands_in_year_month_folder() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = resolver(&[("CreateDate", EXIF_PATTERN)], "%Y_%m")?;
        let file = metadata(&[("CreateDate", json!("2019:04:04 13:18:04"))]);
        assert_eq!(resolver.destination(&file)?, Some("2019_04".to_string()));
        assert_eq!(resolver.destination(&file)?, Some("2019_04".to_string()));
        Ok(())
    }

    #[test]
    fn first_configured_field_present_wins() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = resolver(
            &[("MediaCreateDate", EXIF_PATTERN), ("CreateDate", EXIF_PATTERN)],
            "%Y_%m",
        )?;
        let file = metadata(&[
            ("CreateDate", json!("2019:04:04 13:18:04")),
            ("MediaCreateDate", json!("2020:12:25 08:00:00")),
        ]);
        assert_eq!(resolver.destination(&file)?, Some("2020_12".to_string()));

        let only_create = metadata(&[("CreateDate", json!("2019:04:04 13:18:04"))]);
        assert_eq!(
            resolver.destination(&only_create)?,
            Some("2019_04".to_string())
        );
        Ok(())
    }

    #[test]
    fn missing_fields_yield_no_date() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = resolver(&[("CreateDate", EXIF_PATTERN)], "%Y_%m")?;
        let file = metadata(&[("FileName", json!("photo.jpg"))]);
        assert!(resolver.resolve(&file)?.is_none());
        assert!(resolver.destination(&file)?.is_none());
        Ok(())
    }

    #[test]
    fn malformed_present_field_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = resolver(
            &[("CreateDate", EXIF_PATTERN), ("ModifyDate", EXIF_PATTERN)],
            "%Y_%m",
        )?;
        let file = metadata(&[
            ("CreateDate", json!("0000:00:00 00:00:00")),
            ("ModifyDate", json!("2019:04:04 13:18:04")),
        ]);
        assert!(matches!(
            resolver.resolve(&file),
            Err(ResolveError::Unparseable { .. })
        ));

        let numeric = metadata(&[("CreateDate", json!(2019))]);
        assert!(matches!(
            resolver.resolve(&numeric),
            Err(ResolveError::NotAString { .. })
        ));
        Ok(())
    }

    #[test]
    fn date_only_pattern_resolves_to_midnight() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = resolver(&[("DateCreated", "%Y-%m-%d")], "%Y/%m/%d")?;
        let file = metadata(&[("DateCreated", json!("2018-07-09"))]);
        let resolved = resolver.resolve(&file)?;
        assert_eq!(
            resolved.map(|ts| ts.to_string()),
            Some("2018-07-09 00:00:00".to_string())
        );
        assert_eq!(resolver.destination(&file)?, Some("2018/07/09".to_string()));
        Ok(())
    }

    #[test]
    fn partial_patterns_default_missing_fields() -> Result<(), Box<dyn std::error::Error>> {
        let month_resolver = resolver(&[("CreateDate", "%Y:%m")], "%Y_%m_%d")?;
        let file = metadata(&[("CreateDate", json!("2019:04"))]);
        assert_eq!(
            month_resolver.resolve(&file)?.map(|ts| ts.to_string()),
            Some("2019-04-01 00:00:00".to_string())
        );
        assert_eq!(month_resolver.destination(&file)?, Some("2019_04_01".to_string()));

        let year_only = resolver(&[("Year", "%Y")], "%Y_%m")?;
        let file = metadata(&[("Year", json!("2021"))]);
        assert_eq!(year_only.destination(&file)?, Some("2021_01".to_string()));

        let hour_only = resolver(&[("CreateDate", "%Y-%m-%d %H")], "%Y_%m_%d_%H%M")?;
        let file = metadata(&[("CreateDate", json!("2020-02-29 17"))]);
        assert_eq!(
            hour_only.destination(&file)?,
            Some("2020_02_29_1700".to_string())
        );
        Ok(())
    }

    #[test]
    fn offset_output_pattern_reports_format_error() -> Result<(), Box<dyn std::error::Error>> {
        let resolver = resolver(&[("CreateDate", EXIF_PATTERN)], "%Y_%z")?;
        let file = metadata(&[("CreateDate", json!("2019:04:04 13:18:04"))]);
        assert!(matches!(
            resolver.destination(&file),
            Err(ResolveError::Format { .. })
        ));
        Ok(())
    }
}
