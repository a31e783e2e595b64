//! Single-file snapshot store.
//!
//! [`FileStore`] keeps the whole scheduler state in one document. Each save
//! writes the encoded package to a sibling `*.tmp` file, syncs it, and
//! renames it over the target, so readers see either the previous or the
//! new document and never a half-written one.

use super::serialization::{JsonSnapshotSerializer, SnapshotSerializer};
use super::snapshot::{SchedulerSnapshot, SnapshotPackage};
use super::storage::SnapshotStore;
use crate::scheduler::error::ScheduleError;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// A snapshot store backed by one file on disk.
///
/// # Example
///
/// ```rust,no_run
/// use isbn_scheduler::scheduler::persistence::{FileStore, SnapshotStore};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileStore::new("/tmp/isbn_state.json");
/// let snapshot = store.load()?.unwrap_or_default();
/// store.save(&snapshot)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Target file.
    path: PathBuf,
    /// Encoding used on disk.
    serializer: Arc<dyn SnapshotSerializer>,
}

impl FileStore {
    /// Create a JSON file store at `path`. Nothing is touched on disk until
    /// the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_serializer(path, Arc::new(JsonSnapshotSerializer::new()))
    }

    /// Create a file store using a specific encoding.
    #[must_use]
    pub fn with_serializer(
        path: impl Into<PathBuf>,
        serializer: Arc<dyn SnapshotSerializer>,
    ) -> Self {
        Self {
            path: path.into(),
            serializer,
        }
    }

    /// The target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<SchedulerSnapshot>, ScheduleError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ScheduleError::io(e, &self.path)),
        };
        trace!("read {} bytes from {}", data.len(), self.path.display());

        let package = self.serializer.deserialize_package(&data)?;
        package.into_snapshot().map(Some)
    }

    fn save(&self, snapshot: &SchedulerSnapshot) -> Result<(), ScheduleError> {
        let package = SnapshotPackage::new(snapshot.clone())?;
        let bytes = self.serializer.serialize_package(&package)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScheduleError::io(e, parent))?;
        }

        let temp = self.temp_path();
        {
            let mut file = File::create(&temp).map_err(|e| ScheduleError::io(e, &temp))?;
            file.write_all(&bytes)
                .map_err(|e| ScheduleError::io(e, &temp))?;
            file.sync_all().map_err(|e| ScheduleError::io(e, &temp))?;
        }
        fs::rename(&temp, &self.path).map_err(|e| ScheduleError::io(e, &self.path))?;

        debug!(
            "saved {} blocks and {} assignments to {} ({})",
            snapshot.blocks.len(),
            snapshot.assignments.len(),
            self.path.display(),
            self.serializer.content_type()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
