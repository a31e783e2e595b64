//! Pluggable encoding of snapshot packages.
//!
//! This module provides the [`SnapshotSerializer`] trait and two built-in
//! implementations:
//!
//! - [`JsonSnapshotSerializer`]: human-readable JSON (always available)
//! - `BincodeSnapshotSerializer`: compact binary format (requires the
//!   `bincode` feature)
//!
//! The file store accepts any `Arc<dyn SnapshotSerializer>` so the on-disk
//! format can be chosen at construction time.
//!
//! # Feature Gate
//!
//! The `BincodeSnapshotSerializer` requires the `bincode` feature:
//!
//! ```toml
//! [dependencies]
//! isbn-scheduler = { version = "0.3", features = ["bincode"] }
//! ```

use super::snapshot::{SchedulerSnapshot, SnapshotPackage};
use crate::scheduler::error::ScheduleError;
use tracing::debug;

/// A pluggable encoder for [`SnapshotPackage`] documents.
///
/// Implementations must be `Send + Sync` so a store can be shared across
/// threads via `Arc<dyn SnapshotSerializer>`.
pub trait SnapshotSerializer: Send + Sync + std::fmt::Debug {
    /// Encode a package into a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Serialization`] if the package cannot be encoded.
    fn serialize_package(&self, package: &SnapshotPackage) -> Result<Vec<u8>, ScheduleError>;

    /// Decode a package from a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Deserialization`] if the bytes are malformed.
    fn deserialize_package(&self, data: &[u8]) -> Result<SnapshotPackage, ScheduleError>;

    /// Returns the MIME-like content type identifier for this format.
    #[must_use]
    fn content_type(&self) -> &'static str;
}

// ─── JSON ───────────────────────────────────────────────────────────────────

/// JSON snapshot serializer using `serde_json`.
///
/// Besides the checksummed package it also reads bare
/// `{ "blocks": [...], "assignments": [...] }` documents, which are wrapped
/// in a fresh package on load.
///
/// # Content Type
///
/// `"application/json"`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotSerializer;

impl JsonSnapshotSerializer {
    /// Create a new JSON snapshot serializer.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotSerializer for JsonSnapshotSerializer {
    fn serialize_package(&self, package: &SnapshotPackage) -> Result<Vec<u8>, ScheduleError> {
        serde_json::to_vec_pretty(package).map_err(|e| ScheduleError::Serialization {
            message: e.to_string(),
        })
    }

    fn deserialize_package(&self, data: &[u8]) -> Result<SnapshotPackage, ScheduleError> {
        match serde_json::from_slice::<SnapshotPackage>(data) {
            Ok(package) => Ok(package),
            Err(package_error) => {
                let bare: SchedulerSnapshot = serde_json::from_slice(data).map_err(|_| {
                    ScheduleError::Deserialization {
                        message: package_error.to_string(),
                    }
                })?;
                debug!("read bare snapshot document without checksum envelope");
                SnapshotPackage::new(bare)
            }
        }
    }

    #[inline]
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

// ─── Bincode ────────────────────────────────────────────────────────────────

/// Bincode snapshot serializer for compact binary files.
///
/// # Feature Gate
///
/// Requires the `bincode` feature.
///
/// # Content Type
///
/// `"application/x-bincode"`
#[cfg(feature = "bincode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSnapshotSerializer;

#[cfg(feature = "bincode")]
impl BincodeSnapshotSerializer {
    /// Create a new Bincode snapshot serializer.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "bincode")]
impl SnapshotSerializer for BincodeSnapshotSerializer {
    fn serialize_package(&self, package: &SnapshotPackage) -> Result<Vec<u8>, ScheduleError> {
        bincode::serde::encode_to_vec(package, bincode::config::standard()).map_err(|e| {
            ScheduleError::Serialization {
                message: e.to_string(),
            }
        })
    }

    fn deserialize_package(&self, data: &[u8]) -> Result<SnapshotPackage, ScheduleError> {
        bincode::serde::decode_from_slice(data, bincode::config::standard())
            .map(|(package, _)| package)
            .map_err(|e| ScheduleError::Deserialization {
                message: e.to_string(),
            })
    }

    #[inline]
    fn content_type(&self) -> &'static str {
        "application/x-bincode"
    }
}
