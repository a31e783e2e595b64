//! Identifier allocation and publication scheduling.
//!
//! # Types
//!
//! - [`IsbnScheduler`]: the service other subsystems call
//! - [`Block`] / [`BlockRegistry`]: numeric inventory ranges and first-fit drawing
//! - [`Assignment`] / [`AssignmentStore`]: records indexed by identifier and book reference
//! - [`AssignmentStatus`]: SCHEDULED, ASSIGNED or RESERVED
//! - [`AvailabilityReport`]: capacity and usage summary
//! - [`ImportRecord`] / [`ImportResult`]: bulk import rows and outcomes
//!
//! # Feature Gate
//!
//! - `bincode`: compact binary snapshot encoding
//! - `metrics`: counters for scheduled, assigned and reserved identifiers

pub mod assignment;
pub mod block;
/// Check digits and identifier formatting.
pub mod checksum;
pub mod config;
pub mod error;
/// CSV and JSON bulk import, templates and exports.
pub mod import;
pub mod persistence;
pub mod report;
pub mod service;
pub mod store;

pub use assignment::{
    Assignment, AssignmentStatus, AssignmentUpdate, DEFAULT_PRIORITY, ScheduleRequest,
};
pub use block::{Block, BlockId, BlockRegistry};
pub use checksum::{
    compute_check_digit, format_identifier, hyphenate, is_valid_identifier, normalize_identifier,
    validate_identifier,
};
pub use config::SchedulerConfig;
pub use error::ScheduleError;
pub use import::{IMPORT_COLUMNS, ImportRecord, ImportResult};
pub use persistence::{FileStore, MemoryStore, SchedulerSnapshot, SnapshotStore};
pub use report::{AvailabilityReport, BlockDetail};
pub use service::{IsbnScheduler, UpsertOutcome};
pub use store::AssignmentStore;
