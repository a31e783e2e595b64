//! Point-in-time snapshot of the scheduler state and its checksummed package.

use crate::scheduler::assignment::Assignment;
use crate::scheduler::block::Block;
use crate::scheduler::error::ScheduleError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

/// Format version written into every snapshot package.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Complete scheduler state: every block and every assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Blocks in registration order
    pub blocks: Vec<Block>,

    /// Assignments ordered by identifier
    pub assignments: Vec<Assignment>,

    /// Timestamp when the snapshot was taken (milliseconds since epoch)
    #[serde(default)]
    pub timestamp: u64,
}

impl SchedulerSnapshot {
    /// True when the snapshot holds neither blocks nor assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.assignments.is_empty()
    }

    /// Compare the persisted collections, ignoring the timestamp.
    #[must_use]
    pub fn same_state(&self, other: &SchedulerSnapshot) -> bool {
        self.blocks == other.blocks && self.assignments == other.assignments
    }
}

/// Wrapper that provides checksum validation for [`SchedulerSnapshot`] instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: SchedulerSnapshot,
    /// Hex-encoded SHA-256 of the JSON-encoded snapshot.
    pub checksum: String,
}

impl SnapshotPackage {
    /// Creates a new package computing the checksum of the snapshot contents.
    pub fn new(snapshot: SchedulerSnapshot) -> Result<Self, ScheduleError> {
        let checksum = Self::compute_checksum(&snapshot)?;

        Ok(Self {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ScheduleError> {
        serde_json::to_string_pretty(self).map_err(|error| ScheduleError::Serialization {
            message: error.to_string(),
        })
    }

    /// Deserializes the package from JSON.
    pub fn from_json(data: &str) -> Result<Self, ScheduleError> {
        serde_json::from_str(data).map_err(|error| ScheduleError::Deserialization {
            message: error.to_string(),
        })
    }

    /// Validates the checksum and version.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(ScheduleError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }

        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(ScheduleError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }

        Ok(())
    }

    /// Consumes the package and returns the validated snapshot.
    pub fn into_snapshot(self) -> Result<SchedulerSnapshot, ScheduleError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &SchedulerSnapshot) -> Result<String, ScheduleError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| ScheduleError::Serialization {
                message: error.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);

        let checksum: String = hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        trace!("snapshot checksum: {}", checksum);
        Ok(checksum)
    }
}
