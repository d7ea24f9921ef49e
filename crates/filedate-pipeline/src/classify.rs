//! Batching, metadata extraction and date resolution.
//!
//! # Design
//! - Batches are extracted sequentially; no new batch starts once the signal is raised.
//! - Service results are matched back to the batch by path, in batch order.
//! - Per-file failures are logged and counted; only a failed extraction call is fatal.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use filedate_metadata::{FileMetadata, MetadataService};
use filedate_telemetry::Metrics;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cancel::CancellationSignal;
use crate::dispatcher::StageReport;
use crate::error::PipelineError;
use crate::model::MoveInstruction;
use crate::resolver::DateResolver;

const STAGE: &str = "classify";

/// Second pipeline stage: turns discovered paths into move instructions.
pub(crate) struct BatchClassifier {
    service: Arc<dyn MetadataService>,
    resolver: Arc<DateResolver>,
    batch_size: usize,
    signal: CancellationSignal,
    metrics: Metrics,
}

impl BatchClassifier {
    pub(crate) fn new(
        service: Arc<dyn MetadataService>,
        resolver: Arc<DateResolver>,
        batch_size: usize,
        signal: CancellationSignal,
        metrics: Metrics,
    ) -> Self {
        Self {
            service,
            resolver,
            batch_size,
            signal,
            metrics,
        }
    }

    /// Consume `input` until it closes, emitting instructions on `output`.
    ///
    /// `output` is dropped on return, which closes the relocator's input.
    pub(crate) async fn run(
        self,
        mut input: mpsc::Receiver<PathBuf>,
        output: mpsc::Sender<MoveInstruction>,
    ) -> StageReport {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut emitted = 0_usize;

        while let Some(path) = input.recv().await {
            if self.signal.is_cancelled() {
                info!("classification cancelled");
                return self.finish(emitted, None);
            }
            batch.push(path);
            if batch.len() < self.batch_size {
                continue;
            }
            let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
            match self.classify_batch(full, &output).await {
                Ok(count) => emitted += count,
                Err(err) => return self.abort(emitted, err),
            }
        }

        if !batch.is_empty() {
            if self.signal.is_cancelled() {
                info!("classification cancelled");
                return self.finish(emitted, None);
            }
            match self.classify_batch(batch, &output).await {
                Ok(count) => emitted += count,
                Err(err) => return self.abort(emitted, err),
            }
        }

        self.finish(emitted, None)
    }

    async fn classify_batch(
        &self,
        batch: Vec<PathBuf>,
        output: &mpsc::Sender<MoveInstruction>,
    ) -> Result<usize, PipelineError> {
        debug!(files = batch.len(), "extracting metadata for batch");
        let results = match self.service.extract(&batch).await {
            Ok(results) => {
                self.metrics.inc_metadata_batch("ok");
                results
            }
            Err(source) => {
                self.metrics.inc_metadata_batch("failed");
                return Err(PipelineError::Metadata {
                    files: batch.len(),
                    source,
                });
            }
        };

        let mut emitted = 0_usize;
        for (path, result) in match_results(batch, results) {
            if self.signal.is_cancelled() {
                return Err(PipelineError::Cancelled { stage: STAGE });
            }
            let Some(instruction) = self.instruction_for(path, result) else {
                continue;
            };
            if output.send(instruction).await.is_err() {
                return Err(PipelineError::Disconnected { stage: STAGE });
            }
            emitted += 1;
        }
        Ok(emitted)
    }

    fn instruction_for(
        &self,
        path: PathBuf,
        result: Option<FileMetadata>,
    ) -> Option<MoveInstruction> {
        let Some(metadata) = result else {
            warn!(path = %path.display(), "metadata service returned no result for file");
            self.metrics.inc_file_skipped(STAGE, "extraction_failed");
            return None;
        };
        if let Some(message) = metadata.error() {
            error!(path = %path.display(), error = %message, "metadata extraction failed");
            self.metrics.inc_file_skipped(STAGE, "extraction_failed");
            return None;
        }

        match self.resolver.destination(&metadata) {
            Ok(Some(folder)) => Some(MoveInstruction {
                from: path,
                to: folder,
            }),
            Ok(None) => {
                debug!(path = %path.display(), "no date field found");
                self.metrics.inc_file_skipped(STAGE, "no_date");
                None
            }
            Err(err) => {
                error!(path = %path.display(), error = ?err, "failed to resolve date");
                self.metrics.inc_file_skipped(STAGE, "invalid_date");
                None
            }
        }
    }

    fn abort(&self, emitted: usize, err: PipelineError) -> StageReport {
        if err.is_cancellation() {
            info!("classification cancelled while processing batch");
        } else {
            self.signal.cancel();
        }
        self.finish(emitted, Some(err))
    }

    fn finish(&self, emitted: usize, error: Option<PipelineError>) -> StageReport {
        self.metrics.add_move_instructions(emitted as u64);
        info!(count = emitted, "{emitted} move(s)");
        StageReport {
            count: emitted,
            error,
        }
    }
}

/// Pair each requested path with the service result reported for it.
fn match_results(
    requested: Vec<PathBuf>,
    results: Vec<FileMetadata>,
) -> Vec<(PathBuf, Option<FileMetadata>)> {
    let mut by_path: HashMap<PathBuf, FileMetadata> = HashMap::with_capacity(results.len());
    for result in results {
        let key = result.path().to_path_buf();
        if by_path.contains_key(&key) {
            warn!(path = %key.display(), "duplicate metadata result ignored");
            continue;
        }
        by_path.insert(key, result);
    }

    let matched = requested
        .into_iter()
        .map(|path| {
            let result = by_path.remove(&path);
            (path, result)
        })
        .collect();

    for unexpected in by_path.keys() {
        warn!(path = %unexpected.display(), "metadata result for unrequested file ignored");
    }
    matched
}
