//! Spans for a dispatch run and its stages.
//!
//! # Design
//! - The run span carries both roots, the batch size and the recorded build.
//! - Stages run on spawned tasks, so their spans take the run span as an explicit parent.

use std::path::Path;

use tracing::Span;

use crate::init::build_sha;

/// Span covering one dispatch run from `source` into `destination`.
#[must_use]
pub fn run_span(source: &Path, destination: &Path, batch_size: usize) -> Span {
    tracing::info_span!(
        "run",
        source = %source.display(),
        destination = %destination.display(),
        batch_size,
        build_sha = %build_sha(),
    )
}

/// Span for the pipeline `stage` within `run`.
#[must_use]
pub fn stage_span(run: &Span, stage: &'static str) -> Span {
    tracing::info_span!(parent: run, "stage", stage)
}
