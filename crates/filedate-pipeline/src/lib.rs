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

//! Three-stage pipeline that files a source tree into dated destination folders.
//!
//! Layout: `discover.rs` (source walk), `classify.rs` (batching, metadata lookup, date
//! resolution), `relocate.rs` (directory creation and file moves), `dispatcher.rs` (stage
//! wiring and run summary), `resolver.rs` (date-field precedence and formatting),
//! `cancel.rs` (shared cancellation signal), `model.rs` (instructions, options, summaries).

mod classify;
mod discover;
mod relocate;

pub mod cancel;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod resolver;

pub use cancel::CancellationSignal;
pub use dispatcher::{Dispatcher, validate_roots};
pub use error::{PipelineError, PipelineResult, RelocateError, ResolveError};
pub use model::{DispatchOptions, MoveInstruction, RelocationStats, RunSummary};
pub use resolver::DateResolver;
