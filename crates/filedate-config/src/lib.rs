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

//! File-backed configuration for the date dispatcher.
//!
//! Layout: `model.rs` (typed configuration and the ordered date-field rule set),
//! `loader.rs` (JSON document loading and CLI overrides), `validate.rs`
//! (field validation helpers), `defaults.rs` (fallback values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigOverrides, load_config, load_config_with, parse_config};
pub use model::{DateFieldRule, DateFieldRules, DispatcherConfig, LogFormatSetting, LogLevel};
