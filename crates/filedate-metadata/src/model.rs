//! Per-file extraction results.
//!
//! # Design
//! - Field values stay as raw JSON; consumers decide which shapes they accept.
//! - A per-file error and a field map are mutually exclusive.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Metadata reported for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    path: PathBuf,
    fields: Map<String, Value>,
    error: Option<String>,
}

impl FileMetadata {
    /// Successful extraction carrying the file's field map.
    #[must_use]
    pub fn with_fields(path: impl Into<PathBuf>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
            error: None,
        }
    }

    /// Failed extraction for a single file.
    #[must_use]
    pub fn failed(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: Map::new(),
            error: Some(error.into()),
        }
    }

    /// Path the result refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw value of `name`, if the file carries it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Extraction error for this file, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
