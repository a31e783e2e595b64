/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use isbn_scheduler::prelude::*;
//! ```

// Service and configuration
pub use crate::scheduler::config::SchedulerConfig;
pub use crate::scheduler::service::{IsbnScheduler, UpsertOutcome};

// Records and requests
pub use crate::scheduler::assignment::{
    Assignment, AssignmentStatus, AssignmentUpdate, ScheduleRequest,
};
pub use crate::scheduler::block::{Block, BlockId};
pub use crate::scheduler::report::AvailabilityReport;

// Errors
pub use crate::scheduler::error::ScheduleError;

// Import/export
pub use crate::scheduler::import::{ImportRecord, ImportResult};

// Identifier helpers
pub use crate::scheduler::checksum::{
    compute_check_digit, format_identifier, hyphenate, is_valid_identifier, normalize_identifier,
    validate_identifier,
};

// Storage
pub use crate::scheduler::persistence::{FileStore, MemoryStore, SnapshotStore};

// Utility functions
pub use crate::utils::{current_time_millis, parse_date};
