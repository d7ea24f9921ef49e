//! Command-line arguments for a single dispatch run.

use std::path::PathBuf;

use clap::Parser;
use filedate_config::ConfigOverrides;

/// Sort files into dated folders using their embedded metadata.
#[derive(Debug, Clone, Parser)]
#[command(name = "filedate", version, about = "Sort files into dated folders by metadata")]
pub struct Cli {
    /// Directory tree to classify.
    #[arg(short = 's', long = "source", env = "FILEDATE_SOURCE")]
    pub source: PathBuf,
    /// Root under which dated subfolders are created.
    #[arg(short = 'd', long = "destination", env = "FILEDATE_DESTINATION")]
    pub destination: PathBuf,
    /// JSON configuration file.
    #[arg(short = 'c', long = "config", env = "FILEDATE_CONFIG")]
    pub config: PathBuf,
    /// Files per metadata extraction call; overrides `batchSize`.
    #[arg(short = 'b', long = "batch-size")]
    pub batch_size: Option<usize>,
    /// Log level; overrides `loggingLevel`.
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
    /// Path to the exiftool executable.
    #[arg(long = "exiftool", env = "FILEDATE_EXIFTOOL", default_value = "exiftool")]
    pub exiftool: PathBuf,
}

impl Cli {
    /// Configuration values supplied on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            batch_size: self.batch_size,
            logging_level: self.log_level.clone(),
        }
    }
}
