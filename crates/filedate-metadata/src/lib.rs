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

//! Batch metadata extraction interface and the `exiftool` adapter.
//!
//! Layout: `model.rs` (per-file results), `service.rs` (the `MetadataService` trait),
//! `exiftool.rs` (process-backed implementation), `error.rs` (batch-level failures).

pub mod error;
pub mod exiftool;
pub mod model;
pub mod service;

pub use error::{MetadataError, MetadataResult};
pub use exiftool::ExifTool;
pub use model::FileMetadata;
pub use service::MetadataService;
