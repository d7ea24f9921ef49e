//! Scripted in-memory metadata service.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use filedate_metadata::{FileMetadata, MetadataError, MetadataResult, MetadataService};
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
enum Scripted {
    Fields(Map<String, Value>),
    Error(String),
}

/// Metadata service answering from a fixed script and recording every call.
///
/// Paths without a script entry come back with an empty field map.
#[derive(Debug, Default)]
pub struct ScriptedMetadata {
    script: HashMap<PathBuf, Scripted>,
    fail_on_call: Option<usize>,
    reversed: bool,
    calls: Mutex<Vec<Vec<PathBuf>>>,
}

impl ScriptedMetadata {
    /// Service with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `field = value` for `path`, keeping fields scripted earlier.
    #[must_use]
    pub fn with_date(mut self, path: impl Into<PathBuf>, field: &str, value: &str) -> Self {
        let entry = self
            .script
            .entry(path.into())
            .or_insert_with(|| Scripted::Fields(Map::new()));
        if let Scripted::Fields(fields) = entry {
            fields.insert(field.to_string(), Value::String(value.to_string()));
        } else {
            let mut fields = Map::new();
            fields.insert(field.to_string(), Value::String(value.to_string()));
            *entry = Scripted::Fields(fields);
        }
        self
    }

    /// Report a per-file extraction error for `path`.
    #[must_use]
    pub fn with_error(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.script
            .insert(path.into(), Scripted::Error(message.to_string()));
        self
    }

    /// Fail the whole batch on the `call`-th invocation (1-based) and every one after it.
    #[must_use]
    pub const fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Return results in reverse request order.
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Batches received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of extraction calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn answer(&self, path: &Path) -> FileMetadata {
        match self.script.get(path) {
            Some(Scripted::Fields(fields)) => FileMetadata::with_fields(path, fields.clone()),
            Some(Scripted::Error(message)) => FileMetadata::failed(path, message.clone()),
            None => FileMetadata::with_fields(path, Map::new()),
        }
    }
}

#[async_trait]
impl MetadataService for ScriptedMetadata {
    async fn extract(&self, paths: &[PathBuf]) -> MetadataResult<Vec<FileMetadata>> {
        let call = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push(paths.to_vec());
            calls.len()
        };
        if self.fail_on_call.is_some_and(|failing| call >= failing) {
            return Err(MetadataError::Unavailable {
                detail: format!("scripted failure on call {call}"),
            });
        }

        let mut results: Vec<FileMetadata> = paths.iter().map(|path| self.answer(path)).collect();
        if self.reversed {
            results.reverse();
        }
        Ok(results)
    }
}
