//! Boot sequence: arguments, configuration, logging, then one pipeline run.
//!
//! # Design
//! - Nothing is logged before configuration loads; earlier failures go to stderr.
//! - `execute` takes its metadata service and metrics as parameters so tests can inject them.
//! - Ctrl-C raises the run's cancellation signal; the run then winds down cooperatively.

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use filedate_config::{DispatcherConfig, LogFormatSetting, load_config_with};
use filedate_metadata::{ExifTool, MetadataService};
use filedate_pipeline::{CancellationSignal, DispatchOptions, Dispatcher, RunSummary};
use filedate_telemetry::{LogFormat, LoggingConfig, Metrics};
use tracing::{debug, error, info, warn};

use crate::cli::Cli;
use crate::error::{AppError, AppResult, EXIT_CONFIGURATION};

/// Run with the process arguments and return the exit status.
pub async fn run() -> i32 {
    run_from(std::env::args_os()).await
}

/// Run with explicit arguments (the first being the program name) and return the exit status.
pub async fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match start(args).await {
        Ok(_) => 0,
        Err(AppError::Cli { source }) => {
            if source.print().is_err() {
                eprintln!("{source}");
            }
            EXIT_CONFIGURATION
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn start<I, T>(args: I) -> AppResult<RunSummary>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|source| AppError::Cli { source })?;
    let config = load_config_with(&cli.config, &cli.overrides())
        .map_err(|err| AppError::config("config.load", err))?;

    let logging = LoggingConfig::new(config.logging_level.as_str(), log_format(&config));
    filedate_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let metrics =
        Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;
    let service: Arc<dyn MetadataService> = Arc::new(ExifTool::with_binary(&cli.exiftool));
    execute(&cli, &config, service, metrics).await
}

/// Build the dispatcher from `config` and run it over the CLI's roots.
///
/// # Errors
///
/// Returns [`AppError::Pipeline`] when the options or roots are invalid or the run fails.
pub async fn execute(
    cli: &Cli,
    config: &DispatcherConfig,
    service: Arc<dyn MetadataService>,
    metrics: Metrics,
) -> AppResult<RunSummary> {
    let dispatcher = Dispatcher::new(DispatchOptions::from_config(config), service, metrics.clone())
        .map_err(|err| AppError::pipeline("dispatcher.new", err))?;

    let signal = CancellationSignal::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(signal.clone()));
    let result = dispatcher
        .run_with_signal(&cli.source, &cli.destination, signal)
        .await;
    interrupt.abort();

    match metrics.render() {
        Ok(rendered) => debug!(metrics = %rendered, "run metrics"),
        Err(err) => warn!(error = ?err, "failed to render run metrics"),
    }
    match result {
        Ok(summary) => {
            info!("dispatch complete");
            Ok(summary)
        }
        Err(err) => {
            error!(error = ?err, "dispatch failed");
            Err(AppError::pipeline("dispatcher.run", err))
        }
    }
}

async fn cancel_on_interrupt(signal: CancellationSignal) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            if signal.cancel() {
                warn!("interrupt received; cancelling run");
            }
        }
        Err(err) => warn!(error = %err, "failed to listen for interrupt"),
    }
}

const fn log_format(config: &DispatcherConfig) -> LogFormat {
    match config.log_format {
        Some(LogFormatSetting::Json) => LogFormat::Json,
        Some(LogFormatSetting::Pretty) => LogFormat::Pretty,
        None => LogFormat::infer(),
    }
}
