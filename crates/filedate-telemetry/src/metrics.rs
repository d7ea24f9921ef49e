//! Prometheus-backed run counters and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Every instance owns its registry, so concurrent runs and tests never share counts.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed counters shared by the pipeline stages.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    files_discovered_total: IntCounter,
    move_instructions_total: IntCounter,
    files_moved_total: IntCounter,
    files_skipped_total: IntCounterVec,
    metadata_batches_total: IntCounterVec,
}

/// Snapshot of the run counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Regular files found under the source root.
    pub files_discovered: u64,
    /// Move instructions produced by classification.
    pub move_instructions: u64,
    /// Files relocated into the destination tree.
    pub files_moved: u64,
    /// Metadata extraction calls that returned results.
    pub metadata_batches_ok: u64,
    /// Metadata extraction calls that failed as a whole.
    pub metadata_batches_failed: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let files_discovered_total = IntCounter::with_opts(Opts::new(
            "files_discovered_total",
            "Regular files discovered under the source root",
        ))
        .map_err(|source| collector("files_discovered_total", source))?;
        let move_instructions_total = IntCounter::with_opts(Opts::new(
            "move_instructions_total",
            "Move instructions emitted after date resolution",
        ))
        .map_err(|source| collector("move_instructions_total", source))?;
        let files_moved_total = IntCounter::with_opts(Opts::new(
            "files_moved_total",
            "Files relocated into dated destination folders",
        ))
        .map_err(|source| collector("files_moved_total", source))?;
        let files_skipped_total = IntCounterVec::new(
            Opts::new(
                "files_skipped_total",
                "Files excluded from relocation by stage and reason",
            ),
            &["stage", "reason"],
        )
        .map_err(|source| collector("files_skipped_total", source))?;
        let metadata_batches_total = IntCounterVec::new(
            Opts::new(
                "metadata_batches_total",
                "Metadata extraction calls by outcome",
            ),
            &["outcome"],
        )
        .map_err(|source| collector("metadata_batches_total", source))?;

        register(&registry, "files_discovered_total", &files_discovered_total)?;
        register(&registry, "move_instructions_total", &move_instructions_total)?;
        register(&registry, "files_moved_total", &files_moved_total)?;
        register(&registry, "files_skipped_total", &files_skipped_total)?;
        register(&registry, "metadata_batches_total", &metadata_batches_total)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                files_discovered_total,
                move_instructions_total,
                files_moved_total,
                files_skipped_total,
                metadata_batches_total,
            }),
        })
    }

    /// Add to the discovered file counter.
    pub fn add_files_discovered(&self, count: u64) {
        self.inner.files_discovered_total.inc_by(count);
    }

    /// Add to the emitted move instruction counter.
    pub fn add_move_instructions(&self, count: u64) {
        self.inner.move_instructions_total.inc_by(count);
    }

    /// Add to the relocated file counter.
    pub fn add_files_moved(&self, count: u64) {
        self.inner.files_moved_total.inc_by(count);
    }

    /// Record a file excluded by `stage` for `reason`.
    pub fn inc_file_skipped(&self, stage: &str, reason: &str) {
        self.inner
            .files_skipped_total
            .with_label_values(&[stage, reason])
            .inc();
    }

    /// Record the outcome (`ok` or `failed`) of a metadata extraction call.
    pub fn inc_metadata_batch(&self, outcome: &str) {
        self.inner
            .metadata_batches_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Current value of the skip counter for `stage` and `reason`.
    #[must_use]
    pub fn skipped(&self, stage: &str, reason: &str) -> u64 {
        self.inner
            .files_skipped_total
            .with_label_values(&[stage, reason])
            .get()
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the run counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_discovered: self.inner.files_discovered_total.get(),
            move_instructions: self.inner.move_instructions_total.get(),
            files_moved: self.inner.files_moved_total.get(),
            metadata_batches_ok: self
                .inner
                .metadata_batches_total
                .with_label_values(&["ok"])
                .get(),
            metadata_batches_failed: self
                .inner
                .metadata_batches_total
                .with_label_values(&["failed"])
                .get(),
        }
    }
}

const fn collector(name: &'static str, source: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsCollector { name, source }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.add_files_discovered(3);
        metrics.add_move_instructions(2);
        metrics.add_files_moved(1);
        metrics.inc_file_skipped("classify", "no_date");
        metrics.inc_metadata_batch("ok");
        metrics.inc_metadata_batch("ok");
        metrics.inc_metadata_batch("failed");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_discovered, 3);
        assert_eq!(snapshot.move_instructions, 2);
        assert_eq!(snapshot.files_moved, 1);
        assert_eq!(snapshot.metadata_batches_ok, 2);
        assert_eq!(snapshot.metadata_batches_failed, 1);
        assert_eq!(metrics.skipped("classify", "no_date"), 1);
        assert_eq!(metrics.skipped("relocate", "move_failed"), 0);

        let rendered = metrics.render()?;
        assert!(rendered.contains("files_discovered_total 3"));
        assert!(rendered.contains(r#"files_skipped_total{reason="no_date",stage="classify"} 1"#));
        Ok(())
    }

    #[test]
    fn metrics_instances_are_independent() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;
        first.add_files_moved(4);
        assert_eq!(second.snapshot().files_moved, 0);
        Ok(())
    }

    #[test]
    fn snapshot_serialises_counters() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let metrics = Metrics::new()?;
        metrics.add_files_discovered(1);
        let value = serde_json::to_value(metrics.snapshot())?;
        assert_eq!(value["files_discovered"], 1);
        Ok(())
    }
}
