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

//! `filedate` binary entrypoint.

use std::process;

/// Runs one dispatch and exits with its status code.
#[tokio::main]
async fn main() {
    let exit_code = filedate_app::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
