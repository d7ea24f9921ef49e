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

//! Shared test helpers used across unit and integration suites.
//! Layout: fixtures.rs (source-tree builders), mocks.rs (scripted metadata service).

pub mod fixtures;
pub mod mocks;

pub use fixtures::write_files;
pub use mocks::ScriptedMetadata;
