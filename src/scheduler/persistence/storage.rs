//! Storage port for scheduler snapshots.
//!
//! The scheduler only talks to persistence through [`SnapshotStore`], so the
//! file-backed store can be swapped for a transactional one without touching
//! scheduling logic.
//!
//! # Single writer
//!
//! None of the built-in stores lock across processes. Two processes saving
//! to the same location race and the last write wins.

use super::snapshot::SchedulerSnapshot;
use crate::scheduler::error::ScheduleError;
use std::sync::{Arc, Mutex};

/// Durable home for a [`SchedulerSnapshot`].
pub trait SnapshotStore: Send + Sync + std::fmt::Debug {
    /// Read the last saved snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read or fails
    /// validation.
    fn load(&self) -> Result<Option<SchedulerSnapshot>, ScheduleError>;

    /// Replace the stored snapshot.
    ///
    /// The snapshot must be durable when this returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written.
    fn save(&self, snapshot: &SchedulerSnapshot) -> Result<(), ScheduleError>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn load(&self) -> Result<Option<SchedulerSnapshot>, ScheduleError> {
        (**self).load()
    }

    fn save(&self, snapshot: &SchedulerSnapshot) -> Result<(), ScheduleError> {
        (**self).save(snapshot)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Keeps the last saved snapshot in memory.
///
/// Useful for tests and dry runs. Wrap it in an [`Arc`] to let several
/// schedulers observe the same state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<SchedulerSnapshot>>,
    saves: Mutex<u64>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: SchedulerSnapshot) -> Self {
        Self {
            saved: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// How many times [`save`](SnapshotStore::save) has been called.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        self.saves.lock().map(|count| *count).unwrap_or(0)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<SchedulerSnapshot>, ScheduleError> {
        let saved = self.saved.lock().map_err(|_| ScheduleError::LockPoisoned)?;
        Ok(saved.clone())
    }

    fn save(&self, snapshot: &SchedulerSnapshot) -> Result<(), ScheduleError> {
        *self.saved.lock().map_err(|_| ScheduleError::LockPoisoned)? = Some(snapshot.clone());
        *self.saves.lock().map_err(|_| ScheduleError::LockPoisoned)? += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
