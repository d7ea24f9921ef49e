//! Domain models passed between the pipeline stages.
//!
//! # Design
//! - Instructions carry a subfolder name, never a full destination path.
//! - Options are validated once, before any stage starts.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use filedate_config::validate::{validate_batch_size, validate_output_pattern};
use filedate_config::{ConfigError, DateFieldRules, DispatcherConfig};

use crate::error::{PipelineError, PipelineResult};

/// Pending relocation of one file into a date-named subfolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInstruction {
    /// File to relocate, as discovered.
    pub from: PathBuf,
    /// Destination subfolder name rendered from the file's date.
    pub to: String,
}

/// Settings consumed by the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Number of files per metadata extraction call.
    pub batch_size: usize,
    /// Ordered date-field rules.
    pub date_fields: DateFieldRules,
    /// strftime pattern naming destination subfolders.
    pub output_date_format: String,
}

impl DispatchOptions {
    /// Project the dispatch-relevant settings out of a loaded configuration.
    #[must_use]
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            date_fields: config.date_fields.clone(),
            output_date_format: config.output_date_format.clone(),
        }
    }

    /// Check the options before a run is allowed to start.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Options`] for a zero batch size, an empty rule set or an invalid
    /// output pattern.
    pub fn validate(&self) -> PipelineResult<()> {
        validate_batch_size(self.batch_size).map_err(|source| PipelineError::Options { source })?;
        if self.date_fields.is_empty() {
            return Err(PipelineError::Options {
                source: ConfigError::InvalidField {
                    field: "dateFields",
                    reason: "empty",
                    value: None,
                },
            });
        }
        validate_output_pattern(&self.output_date_format)
            .map_err(|source| PipelineError::Options { source })
    }

    pub(crate) const fn path_channel_capacity(&self) -> usize {
        self.batch_size.saturating_mul(2)
    }

    pub(crate) const fn instruction_channel_capacity(&self) -> usize {
        self.batch_size
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Regular files found under the source root.
    pub discovered: usize,
    /// Move instructions produced by classification.
    pub classified: usize,
    /// Files relocated.
    pub moved: usize,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) found, {} classified, {} moved",
            self.discovered, self.classified, self.moved
        )
    }
}

/// Relocator bookkeeping for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelocationStats {
    /// Files relocated.
    pub moved: usize,
    /// Instructions that failed (directory creation or move).
    pub failed: usize,
    /// Destination subfolders created.
    pub directories_created: usize,
    /// Instructions whose subfolder was already known to exist.
    pub cache_hits: usize,
    /// Instructions drained without action after cancellation.
    pub skipped_cancelled: usize,
}
