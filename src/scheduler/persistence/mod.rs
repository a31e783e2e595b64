//! Persistence of the complete scheduler state.
//!
//! # Types
//!
//! - [`SchedulerSnapshot`]: every block and assignment at one point in time
//! - [`SnapshotPackage`]: versioned, SHA-256 checksummed envelope
//! - [`SnapshotSerializer`]: pluggable on-disk encoding
//! - [`SnapshotStore`]: storage port used by the scheduler
//! - [`FileStore`]: single-file store with atomic replace
//! - [`MemoryStore`]: in-memory store for tests and dry runs

pub mod file_store;
pub mod serialization;
pub mod snapshot;
pub mod storage;

pub use file_store::FileStore;
#[cfg(feature = "bincode")]
pub use serialization::BincodeSnapshotSerializer;
pub use serialization::{JsonSnapshotSerializer, SnapshotSerializer};
pub use snapshot::{SNAPSHOT_FORMAT_VERSION, SchedulerSnapshot, SnapshotPackage};
pub use storage::{MemoryStore, SnapshotStore};
