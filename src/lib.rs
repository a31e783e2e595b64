//! # ISBN Scheduler
//!
//! Allocation, scheduling and persistence of 13-digit publication
//! identifiers drawn from numeric inventory blocks owned by a publisher.
//!
//! ## Key Features
//!
//! - **Check Digits**: Alternating 1/3 weighted modulo-10 check digit, validation of
//!   hand-typed identifiers and hyphenated display form.
//!
//! - **Block Inventory**: Contiguous sequence ranges per prefix and registrant code.
//!   Numbers are drawn first-fit in registration order and never reissued, even if
//!   the caller abandons them.
//!
//! - **Assignment Lifecycle**: Every identifier is SCHEDULED, RESERVED or ASSIGNED.
//!   Transitions go through dedicated operations; ASSIGNED is terminal.
//!
//! - **Idempotent Rebuilds**: `get_or_assign` returns the identifier a book already
//!   holds and refreshes its fields, so repeated rebuild runs never allocate twice.
//!
//! - **Ownership Guarantee**: A hand-registered identifier owned by one book
//!   reference can never be taken over by another.
//!
//! - **Bulk Import/Export**: CSV and JSON sources mixing supplied and auto-drawn
//!   identifiers, with per-row error collection instead of all-or-nothing batches.
//!
//! - **Durable State**: Every mutation writes a versioned, SHA-256 checksummed
//!   snapshot through a pluggable storage port.
//!
//! ## Identifier Layout
//!
//! ```text
//!  978   123456   001   0
//!  ───   ──────   ───   ─
//!  │     │        │     └─ check digit
//!  │     │        └─────── sequence number, zero-padded to fill 12 digits
//!  │     └──────────────── registrant code
//!  └────────────────────── prefix
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use isbn_scheduler::prelude::*;
//! use chrono::NaiveDate;
//!
//! let mut scheduler = IsbnScheduler::in_memory();
//! scheduler.add_block("978", 1000, 1999, "123456", None).unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
//! let identifier = scheduler
//!     .schedule(ScheduleRequest::new("Book One", "b1", date))
//!     .expect("inventory available");
//! assert!(identifier.starts_with("978123456"));
//!
//! assert!(scheduler.assign_now(&identifier));
//! assert_eq!(
//!     scheduler.get(&identifier).map(|a| a.status),
//!     Some(AssignmentStatus::Assigned)
//! );
//! ```
//!
//! ## Persistence
//!
//! [`IsbnScheduler::open`] binds the scheduler to a JSON file. The file holds a
//! `version`, a `checksum` and a `snapshot` with `blocks` and `assignments`.
//! Bare `{ "blocks": [...], "assignments": [...] }` documents are accepted on load.
//! A missing or corrupt file starts an empty scheduler and logs a warning.
//!
//! Saves are not locked across processes: run a single writer per file.
//!
//! ## Feature Flags
//!
//! | Feature   | Description                                              |
//! |-----------|----------------------------------------------------------|
//! | `bincode` | Binary snapshot encoding via `BincodeSnapshotSerializer` |
//! | `metrics` | Counters and an availability gauge via the `metrics` crate |
//!
//! ## Logging
//!
//! All diagnostics go through `tracing`. Install any subscriber to see them;
//! the demos use `tracing_subscriber` with an `EnvFilter`.

pub mod scheduler;

pub mod prelude;
mod utils;

#[cfg(feature = "bincode")]
pub use scheduler::persistence::BincodeSnapshotSerializer;
pub use scheduler::persistence::{
    FileStore, JsonSnapshotSerializer, MemoryStore, SNAPSHOT_FORMAT_VERSION, SchedulerSnapshot,
    SnapshotPackage, SnapshotSerializer, SnapshotStore,
};
pub use scheduler::{
    Assignment, AssignmentStatus, AssignmentStore, AssignmentUpdate, AvailabilityReport, Block,
    BlockDetail, BlockId, BlockRegistry, IMPORT_COLUMNS, ImportRecord, ImportResult,
    IsbnScheduler, ScheduleError, ScheduleRequest, SchedulerConfig, UpsertOutcome,
    compute_check_digit, format_identifier, hyphenate, is_valid_identifier, normalize_identifier,
    validate_identifier,
};
pub use utils::{current_time_millis, parse_date};
