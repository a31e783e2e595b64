//! Scheduler configuration.

use super::error::ScheduleError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix used when the caller does not pick one.
pub const DEFAULT_PREFIX: &str = "978";

/// Configuration for an [`IsbnScheduler`](super::service::IsbnScheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Snapshot file. `None` keeps state in memory only.
    pub storage_path: Option<PathBuf>,
    /// Registrant-group prefix used by [`add_default_block`](super::service::IsbnScheduler::add_default_block).
    pub default_prefix: String,
    /// Publisher applied to new records that do not name one.
    pub default_publisher: Option<String>,
    /// Format applied to new records that do not name one.
    pub default_format: Option<String>,
    /// Write a snapshot after every mutating call.
    pub persist_on_mutation: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            default_prefix: DEFAULT_PREFIX.to_string(),
            default_publisher: None,
            default_format: None,
            persist_on_mutation: true,
        }
    }
}

impl SchedulerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot file.
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Sets the default prefix.
    #[must_use]
    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = prefix.into();
        self
    }

    /// Sets the default publisher.
    #[must_use]
    pub fn with_default_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.default_publisher = Some(publisher.into());
        self
    }

    /// Sets the default format.
    #[must_use]
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    /// Enables or disables the snapshot write after each mutation.
    #[must_use]
    pub fn with_persist_on_mutation(mut self, enabled: bool) -> Self {
        self.persist_on_mutation = enabled;
        self
    }

    /// Load a configuration from a JSON file. Missing keys take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Io`] if the file cannot be read and
    /// [`ScheduleError::Deserialization`] if it is not valid JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| ScheduleError::io(e, path))?;
        serde_json::from_str(&data).map_err(|error| ScheduleError::Deserialization {
            message: error.to_string(),
        })
    }
}
