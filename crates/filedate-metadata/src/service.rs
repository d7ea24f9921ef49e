//! Extraction trait implemented by metadata adapters.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::MetadataResult;
use crate::model::FileMetadata;

/// Batch metadata extraction service.
///
/// Implementations return one [`FileMetadata`] per file they could report on, in any order;
/// callers match results back to requests by path. Failures that concern a single file are
/// carried inside its [`FileMetadata`]; an `Err` means the whole call failed.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Extract metadata for every path in `paths`.
    async fn extract(&self, paths: &[PathBuf]) -> MetadataResult<Vec<FileMetadata>>;
}
