//! Stage wiring, completion and run outcome.
//!
//! # Design
//! - Discovery runs on the blocking pool; classification and relocation are async tasks.
//! - Channels are bounded: paths hold two batches, instructions hold one.
//! - The first non-cancellation error reported by a stage decides the run outcome.
//! - Each stage logs inside its own span, nested under the run span.

use std::path::Path;
use std::sync::Arc;

use filedate_metadata::MetadataService;
use filedate_telemetry::{Metrics, run_span, stage_span};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{Instrument, Span, debug, info, warn};

use crate::cancel::CancellationSignal;
use crate::classify::BatchClassifier;
use crate::discover::discover_files;
use crate::error::{PipelineError, PipelineResult};
use crate::model::{DispatchOptions, RelocationStats, RunSummary};
use crate::relocate::{RelocationReport, Relocator};
use crate::resolver::DateResolver;

/// What a stage reports back to the coordinator when it exits.
#[derive(Debug)]
pub(crate) struct StageReport {
    pub(crate) count: usize,
    pub(crate) error: Option<PipelineError>,
}

/// Check that `source` and `destination` can host a run.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidRoot`] when the source is not an existing directory, the
/// destination exists but is not a directory, or the destination lies inside the source tree.
pub fn validate_roots(source: &Path, destination: &Path) -> PipelineResult<()> {
    if !source.is_dir() {
        return Err(invalid_root("source", "not_a_directory", source));
    }
    if destination.exists() && !destination.is_dir() {
        return Err(invalid_root("destination", "not_a_directory", destination));
    }

    let source_abs = source
        .canonicalize()
        .map_err(|_| invalid_root("source", "unresolvable", source))?;
    let destination_abs = if destination.exists() {
        destination.canonicalize()
    } else {
        std::path::absolute(destination)
    }
    .map_err(|_| invalid_root("destination", "unresolvable", destination))?;

    if destination_abs.starts_with(&source_abs) {
        return Err(invalid_root("destination", "inside_source", destination));
    }
    Ok(())
}

fn invalid_root(field: &'static str, reason: &'static str, path: &Path) -> PipelineError {
    PipelineError::InvalidRoot {
        field,
        reason,
        path: path.to_path_buf(),
    }
}

/// Coordinates one discover, classify and relocate run at a time.
#[derive(Clone)]
pub struct Dispatcher {
    options: DispatchOptions,
    resolver: Arc<DateResolver>,
    service: Arc<dyn MetadataService>,
    metrics: Metrics,
}

impl Dispatcher {
    /// Build a dispatcher over validated options.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Options`] when the options fail validation.
    pub fn new(
        options: DispatchOptions,
        service: Arc<dyn MetadataService>,
        metrics: Metrics,
    ) -> PipelineResult<Self> {
        options.validate()?;
        let resolver = Arc::new(DateResolver::new(
            options.date_fields.clone(),
            options.output_date_format.clone(),
        ));
        Ok(Self {
            options,
            resolver,
            service,
            metrics,
        })
    }

    /// Classify every file under `source` into dated folders under `destination`.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::run_with_signal`].
    pub async fn run(&self, source: &Path, destination: &Path) -> PipelineResult<RunSummary> {
        self.run_with_signal(source, destination, CancellationSignal::new())
            .await
    }

    /// Run with a caller-owned cancellation signal.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRoot`] before any stage starts when the roots are
    /// unusable, the first fatal stage error otherwise, or [`PipelineError::Cancelled`] when the
    /// signal was raised from outside the pipeline.
    pub async fn run_with_signal(
        &self,
        source: &Path,
        destination: &Path,
        signal: CancellationSignal,
    ) -> PipelineResult<RunSummary> {
        validate_roots(source, destination)?;
        let run = run_span(source, destination, self.options.batch_size);
        self.dispatch(source, destination, signal, &run)
            .instrument(run.clone())
            .await
    }

    async fn dispatch(
        &self,
        source: &Path,
        destination: &Path,
        signal: CancellationSignal,
        run: &Span,
    ) -> PipelineResult<RunSummary> {
        info!("starting dispatch");
        let (path_tx, path_rx) = mpsc::channel(self.options.path_channel_capacity());
        let (move_tx, move_rx) = mpsc::channel(self.options.instruction_channel_capacity());

        let discover = {
            let root = source.to_path_buf();
            let signal = signal.clone();
            let metrics = self.metrics.clone();
            let span = stage_span(run, "discover");
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| discover_files(&root, path_tx, &signal, &metrics))
            })
        };
        let classify = tokio::spawn(
            BatchClassifier::new(
                Arc::clone(&self.service),
                Arc::clone(&self.resolver),
                self.options.batch_size,
                signal.clone(),
                self.metrics.clone(),
            )
            .run(path_rx, move_tx)
            .instrument(stage_span(run, "classify")),
        );
        let relocate = tokio::spawn(
            Relocator::new(destination.to_path_buf(), signal.clone(), self.metrics.clone())
                .run(move_rx)
                .instrument(stage_span(run, "relocate")),
        );

        let (discovered, classified, relocated) = tokio::join!(discover, classify, relocate);
        let discovered = joined("discover", discovered, &signal);
        let classified = joined("classify", classified, &signal);
        let mut stats = RelocationStats::default();
        let relocated = joined(
            "relocate",
            relocated.map(|report: RelocationReport| {
                stats = report.stats;
                report.stage
            }),
            &signal,
        );

        let summary = RunSummary {
            discovered: discovered.count,
            classified: classified.count,
            moved: relocated.count,
        };
        info!(
            discovered = summary.discovered,
            classified = summary.classified,
            moved = summary.moved,
            "{summary}"
        );
        debug!(?stats, "relocation stats");

        let fatal = [discovered.error, classified.error, relocated.error]
            .into_iter()
            .flatten()
            .find(|err| !err.is_cancellation());
        match fatal {
            Some(err) => Err(err),
            None if signal.is_cancelled() => Err(PipelineError::Cancelled {
                stage: "dispatcher",
            }),
            None => Ok(summary),
        }
    }
}

fn joined(
    stage: &'static str,
    result: Result<StageReport, JoinError>,
    signal: &CancellationSignal,
) -> StageReport {
    match result {
        Ok(report) => report,
        Err(err) => {
            warn!(stage, error = %err, "pipeline stage terminated abnormally");
            signal.cancel();
            StageReport {
                count: 0,
                error: Some(PipelineError::StageTerminated {
                    stage,
                    detail: err.to_string(),
                }),
            }
        }
    }
}
