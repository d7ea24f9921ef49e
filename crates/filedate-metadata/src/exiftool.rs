//! `exiftool`-backed metadata extraction.
//!
//! # Design
//! - One `exiftool -j -q -m` process per batch; output is a JSON array of objects.
//! - Objects are keyed by their `SourceFile` entry; an `Error` entry marks a per-file failure.
//! - A non-zero exit status is tolerated when output was produced, since exiftool exits 1
//!   whenever any single file fails.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MetadataError, MetadataResult};
use crate::model::FileMetadata;
use crate::service::MetadataService;

const BASE_ARGS: [&str; 3] = ["-j", "-q", "-m"];
const SOURCE_FILE_KEY: &str = "SourceFile";
const ERROR_KEY: &str = "Error";

/// Metadata service that shells out to `exiftool`.
#[derive(Debug, Clone)]
pub struct ExifTool {
    binary: PathBuf,
}

impl ExifTool {
    /// Use the executable at `binary`; a bare name is looked up on `PATH`.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl MetadataService for ExifTool {
    async fn extract(&self, paths: &[PathBuf]) -> MetadataResult<Vec<FileMetadata>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        debug!(binary = %self.binary.display(), files = paths.len(), "invoking exiftool");
        let output = Command::new(&self.binary)
            .args(BASE_ARGS)
            .args(paths)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| MetadataError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(MetadataError::EmptyOutput {
                binary: self.binary.clone(),
                status: output.status.code(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!(stderr = %stderr, "exiftool reported diagnostics");
        }

        parse_output(&output.stdout)
    }
}

/// Decode `exiftool -j` output into per-file results.
///
/// # Errors
///
/// Returns [`MetadataError::Decode`] for invalid JSON and
/// [`MetadataError::UnexpectedOutput`] when the document is not an array.
pub fn parse_output(stdout: &[u8]) -> MetadataResult<Vec<FileMetadata>> {
    let document: Value =
        serde_json::from_slice(stdout).map_err(|source| MetadataError::Decode { source })?;
    let Value::Array(entries) = document else {
        return Err(MetadataError::UnexpectedOutput {
            reason: "not_an_array",
        });
    };

    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(fields) = entry else {
            warn!("skipping exiftool entry that is not an object");
            continue;
        };
        let Some(source) = fields.get(SOURCE_FILE_KEY).and_then(Value::as_str) else {
            warn!("skipping exiftool entry without a source file");
            continue;
        };
        let path = PathBuf::from(source);
        match fields.get(ERROR_KEY) {
            Some(error) => {
                let message = error
                    .as_str()
                    .map_or_else(|| error.to_string(), str::to_string);
                results.push(FileMetadata::failed(path, message));
            }
            None => results.push(FileMetadata::with_fields(path, fields)),
        }
    }
    Ok(results)
}
