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

//! Command-line front end for the date dispatcher.
//!
//! Layout: `cli.rs` (argument parsing), `bootstrap.rs` (config, logging and pipeline wiring),
//! `error.rs` (application errors and exit codes), `main.rs` (thin entrypoint delegating to
//! `run()`).

/// Configuration, telemetry and pipeline wiring.
pub mod bootstrap;
/// Command-line arguments.
pub mod cli;
/// Application errors and exit-code mapping.
pub mod error;

pub use bootstrap::{execute, run, run_from};
pub use cli::Cli;
pub use error::{AppError, AppResult};
