//! Source-tree fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Create each relative path under `root`, with parent directories, and return the full paths
/// in the order given. File contents are the relative path itself.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be created.
pub fn write_files(root: &Path, relative: &[&str]) -> Result<Vec<PathBuf>> {
    relative
        .iter()
        .map(|rel| {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, rel.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(path)
        })
        .collect()
}
