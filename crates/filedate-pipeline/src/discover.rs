//! Source tree walk feeding the classifier.
//!
//! # Design
//! - Only regular files are emitted. Symlinks are neither followed nor emitted, so a linked file
//!   is never moved out from under its link and a linked directory is never walked twice.
//! - Any walk error, including one deep below the root, is fatal and raises the run's signal.

use std::path::{Path, PathBuf};

use filedate_telemetry::Metrics;
use tokio::sync::mpsc;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cancel::CancellationSignal;
use crate::dispatcher::StageReport;
use crate::error::PipelineError;

/// Walk `root` and push every regular file onto `output`.
///
/// Blocking: run on the blocking pool. The sender is dropped on return, which closes the
/// classifier's input.
pub(crate) fn discover_files(
    root: &Path,
    output: mpsc::Sender<PathBuf>,
    signal: &CancellationSignal,
    metrics: &Metrics,
) -> StageReport {
    let mut found = 0_usize;
    let mut failure = None;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source.path().unwrap_or(root).to_path_buf();
                signal.cancel();
                failure = Some(PipelineError::Walk { path, source });
                break;
            }
        };

        let file_type = entry.file_type();
        if !file_type.is_file() {
            if !file_type.is_dir() {
                debug!(path = %entry.path().display(), "skipping non-regular entry");
            }
            continue;
        }

        if signal.is_cancelled() {
            break;
        }
        let path = entry.into_path();
        debug!(path = %path.display(), "new file to extract");
        if output.blocking_send(path).is_err() {
            debug!("classifier stopped accepting files; ending walk");
            break;
        }
        found += 1;
    }

    metrics.add_files_discovered(found as u64);
    info!(count = found, "{found} file(s) found");
    StageReport {
        count: found,
        error: failure,
    }
}
