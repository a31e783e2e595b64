//! Scheduler error types

use crate::scheduler::assignment::AssignmentStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur within the identifier scheduler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ScheduleError {
    /// No registered block has an unused sequence number left
    #[error("capacity exhausted: no block has remaining sequence numbers")]
    CapacityExhausted,

    /// The identifier (or book reference) is already owned by another publication
    #[error("identifier {identifier} is owned by book {owner}, cannot bind it to {requested}")]
    Conflict {
        /// The contested identifier
        identifier: String,
        /// Book reference currently holding the identifier
        owner: String,
        /// Book reference that asked for it
        requested: String,
    },

    /// The book reference already holds a different identifier
    #[error("book {book_ref} already holds identifier {identifier}")]
    BookAlreadyAssigned {
        /// The book reference
        book_ref: String,
        /// Identifier it currently holds
        identifier: String,
    },

    /// The identifier is malformed
    #[error("invalid identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected input
        identifier: String,
        /// Why it was rejected
        reason: String,
    },

    /// A required field was empty or absent
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the field
        field: &'static str,
    },

    /// A date could not be parsed as `YYYY-MM-DD`
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input
        value: String,
    },

    /// A numeric field could not be parsed
    #[error("invalid value {value:?} for field {field}")]
    InvalidField {
        /// Name of the field
        field: &'static str,
        /// The rejected input
        value: String,
    },

    /// A block definition was rejected
    #[error("invalid block: {message}")]
    InvalidBlock {
        /// Description of the problem
        message: String,
    },

    /// The identifier or book reference is unknown
    #[error("not found: {key}")]
    NotFound {
        /// The identifier or book reference that was looked up
        key: String,
    },

    /// The requested status change is not permitted
    #[error("identifier {identifier} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The identifier whose status was changed
        identifier: String,
        /// Current status
        from: AssignmentStatus,
        /// Requested status
        to: AssignmentStatus,
    },

    /// An I/O error occurred while reading or writing persisted state
    #[error("I/O error{}: {message}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Io {
        /// The underlying I/O error message
        message: String,
        /// The file path involved, if known
        path: Option<PathBuf>,
    },

    /// Error while serializing state
    #[error("serialization error: {message}")]
    Serialization {
        /// Underlying error message
        message: String,
    },

    /// Error while deserializing state
    #[error("deserialization error: {message}")]
    Deserialization {
        /// Underlying error message
        message: String,
    },

    /// An internal lock was poisoned (another thread panicked while holding it)
    #[error("snapshot store lock poisoned")]
    LockPoisoned,

    /// Snapshot integrity check failed
    #[error("checksum mismatch: expected {expected}, but computed {actual}")]
    ChecksumMismatch {
        /// Checksum stored in the document
        expected: String,
        /// Checksum computed from the payload
        actual: String,
    },

    /// Snapshot was written by an incompatible format version
    #[error("unsupported snapshot version: {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
        /// Version this build understands
        expected: u32,
    },
}

impl ScheduleError {
    /// Shorthand for an [`ScheduleError::InvalidIdentifier`].
    pub(crate) fn invalid_identifier(identifier: &str, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    /// Wraps an I/O error together with the path it concerns.
    pub(crate) fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ScheduleError::Io {
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// True when the error means the caller must provision more inventory.
    #[must_use]
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, ScheduleError::CapacityExhausted)
    }
}

impl From<std::io::Error> for ScheduleError {
    #[cold]
    fn from(err: std::io::Error) -> Self {
        ScheduleError::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<csv::Error> for ScheduleError {
    fn from(err: csv::Error) -> Self {
        ScheduleError::Deserialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = ScheduleError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/tmp/state.json",
        );
        let display = format!("{err}");
        assert!(display.contains("/tmp/state.json"));
        assert!(display.contains("gone"));

        let bare: ScheduleError = std::io::Error::other("boom").into();
        assert_eq!(format!("{bare}"), "I/O error: boom");
    }

    #[test]
    fn test_transition_error_display() {
        let err = ScheduleError::InvalidTransition {
            identifier: "9781234560014".to_string(),
            from: AssignmentStatus::Assigned,
            to: AssignmentStatus::Reserved,
        };
        assert_eq!(
            format!("{err}"),
            "identifier 9781234560014 cannot move from ASSIGNED to RESERVED"
        );
    }

    #[test]
    fn test_capacity_predicate() {
        assert!(ScheduleError::CapacityExhausted.is_capacity_exhausted());
        assert!(
            !ScheduleError::MissingField { field: "title" }.is_capacity_exhausted()
        );
    }
}
