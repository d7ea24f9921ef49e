//! Fallback values applied when the configuration document omits a field.
//!
//! # Design
//! - Keep defaults in one place so the loader and the CLI agree on them.

/// Batch size used when the document does not specify one.
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Logging level used when the document does not specify one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Output pattern producing `YYYY_MM` destination subfolders.
pub const DEFAULT_OUTPUT_DATE_FORMAT: &str = "%Y_%m";
