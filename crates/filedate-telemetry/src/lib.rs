#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Telemetry primitives shared across the filedate workspace.
//!
//! This crate centralises logging setup, the run and stage spans, and the run counters so the
//! pipeline and the binary report progress the same way.

pub mod context;
pub mod error;
pub mod init;
pub mod metrics;

pub use context::{run_span, stage_span};
pub use error::{Result, TelemetryError};
pub use init::{LogFormat, LoggingConfig, build_sha, init_logging};
pub use metrics::{Metrics, MetricsSnapshot};
