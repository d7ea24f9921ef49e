//! Destination directory creation and file relocation.
//!
//! # Design
//! - Subfolders are created lazily and remembered for the rest of the run.
//! - A move is copy, length check, then source removal. An existing destination file is never
//!   overwritten.
//! - Every failure here is per-file: logged, counted and skipped.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filedate_telemetry::Metrics;
use tokio::fs::{self, File, OpenOptions};
use tokio::io;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationSignal;
use crate::dispatcher::StageReport;
use crate::error::RelocateError;
use crate::model::{MoveInstruction, RelocationStats};

const STAGE: &str = "relocate";

/// Final pipeline stage: files each instruction under the destination root.
pub(crate) struct Relocator {
    destination: PathBuf,
    created: HashSet<String>,
    stats: RelocationStats,
    signal: CancellationSignal,
    metrics: Metrics,
}

impl Relocator {
    pub(crate) fn new(destination: PathBuf, signal: CancellationSignal, metrics: Metrics) -> Self {
        Self {
            destination,
            created: HashSet::new(),
            stats: RelocationStats::default(),
            signal,
            metrics,
        }
    }

    /// Drain `input` until the classifier closes it.
    ///
    /// After cancellation instructions are still consumed so upstream senders never block.
    pub(crate) async fn run(mut self, mut input: mpsc::Receiver<MoveInstruction>) -> RelocationReport {
        let mut announced = false;
        while let Some(instruction) = input.recv().await {
            if self.signal.is_cancelled() {
                if !announced {
                    info!("relocation cancelled; draining remaining instructions");
                    announced = true;
                }
                self.stats.skipped_cancelled += 1;
                self.metrics.inc_file_skipped(STAGE, "cancelled");
                continue;
            }
            self.handle(instruction).await;
        }

        let moved = self.stats.moved;
        self.metrics.add_files_moved(moved as u64);
        info!(
            count = moved,
            failed = self.stats.failed,
            directories_created = self.stats.directories_created,
            "{moved} moved file(s)"
        );
        RelocationReport {
            stage: StageReport {
                count: moved,
                error: None,
            },
            stats: self.stats,
        }
    }

    async fn handle(&mut self, instruction: MoveInstruction) {
        let folder = match self.ensure_directory(&instruction.to).await {
            Ok(folder) => folder,
            Err(err) => {
                error!(folder = %instruction.to, error = ?err, "failed to create destination folder");
                self.record_failure(&err);
                return;
            }
        };

        match relocate_file(&instruction.from, &folder).await {
            Ok(target) => {
                debug!(from = %instruction.from.display(), to = %target.display(), "file moved");
                self.stats.moved += 1;
            }
            Err(err @ RelocateError::Remove { .. }) => {
                warn!(
                    from = %instruction.from.display(),
                    error = ?err,
                    "file copied but source could not be removed; it now exists twice"
                );
                self.record_failure(&err);
            }
            Err(err) => {
                error!(from = %instruction.from.display(), error = ?err, "failed to move file");
                self.record_failure(&err);
            }
        }
    }

    async fn ensure_directory(&mut self, subfolder: &str) -> Result<PathBuf, RelocateError> {
        let folder = self.destination.join(subfolder);
        if self.created.contains(subfolder) {
            self.stats.cache_hits += 1;
            return Ok(folder);
        }
        fs::create_dir_all(&folder)
            .await
            .map_err(|source| RelocateError::CreateDirectory {
                path: folder.clone(),
                source,
            })?;
        debug!(folder = %folder.display(), "destination folder ready");
        self.created.insert(subfolder.to_string());
        self.stats.directories_created += 1;
        Ok(folder)
    }

    fn record_failure(&mut self, err: &RelocateError) {
        self.stats.failed += 1;
        self.metrics.inc_file_skipped(STAGE, err.reason());
    }
}

/// Outcome of the relocation stage.
pub(crate) struct RelocationReport {
    pub(crate) stage: StageReport,
    pub(crate) stats: RelocationStats,
}

/// Move `source` into `folder`, keeping its base name. Returns the new path.
pub(crate) async fn relocate_file(source: &Path, folder: &Path) -> Result<PathBuf, RelocateError> {
    let name = source
        .file_name()
        .ok_or_else(|| RelocateError::MissingFileName {
            path: source.to_path_buf(),
        })?;
    let target = folder.join(name);

    let mut input = File::open(source)
        .await
        .map_err(|err| copy_error(source, &target, err))?;
    let expected = input
        .metadata()
        .await
        .map_err(|err| copy_error(source, &target, err))?
        .len();

    let mut output = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .await
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(RelocateError::DestinationExists { path: target });
        }
        Err(err) => return Err(copy_error(source, &target, err)),
    };

    let copied = io::copy(&mut input, &mut output).await;
    let synced = match copied {
        Ok(written) => output.sync_all().await.map(|()| written),
        Err(err) => Err(err),
    };
    drop(output);
    let written = match synced {
        Ok(written) => written,
        Err(err) => {
            discard_partial(&target).await;
            return Err(copy_error(source, &target, err));
        }
    };
    if written != expected {
        discard_partial(&target).await;
        return Err(RelocateError::Verify {
            path: target,
            expected,
            actual: written,
        });
    }

    drop(input);
    fs::remove_file(source)
        .await
        .map_err(|err| RelocateError::Remove {
            path: source.to_path_buf(),
            source: err,
        })?;
    Ok(target)
}

fn copy_error(from: &Path, to: &Path, source: std::io::Error) -> RelocateError {
    RelocateError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

async fn discard_partial(target: &Path) {
    if let Err(err) = fs::remove_file(target).await {
        warn!(path = %target.display(), error = %err, "failed to remove partial copy");
    }
}
