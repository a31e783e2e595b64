//! Assignment records, their lifecycle status and field updates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ScheduleError;

/// Default priority given to new assignments.
pub const DEFAULT_PRIORITY: u32 = 1;

/// Lifecycle status of an assignment.
///
/// `Scheduled` is the initial state. `Assigned` is terminal. `Reserved` is a
/// side branch out of `Scheduled` that can be released back to `Scheduled`
/// or activated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// Set aside for a planned book; not yet activated downstream
    Scheduled,
    /// Activated and sent downstream
    Assigned,
    /// Deliberately excluded from the normal flow
    Reserved,
}

impl AssignmentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [AssignmentStatus; 3] = [
        AssignmentStatus::Scheduled,
        AssignmentStatus::Assigned,
        AssignmentStatus::Reserved,
    ];

    /// Whether a record in this status may move to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        match (self, next) {
            (Scheduled, Assigned) | (Reserved, Assigned) => true,
            (Scheduled, Reserved) | (Reserved, Reserved) => true,
            (Reserved, Scheduled) => true,
            (Scheduled, Scheduled) => false,
            (Assigned, _) => false,
        }
    }

    /// Upper-case label used in persisted documents and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Scheduled => "SCHEDULED",
            AssignmentStatus::Assigned => "ASSIGNED",
            AssignmentStatus::Reserved => "RESERVED",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(AssignmentStatus::Scheduled),
            "ASSIGNED" => Ok(AssignmentStatus::Assigned),
            "RESERVED" => Ok(AssignmentStatus::Reserved),
            _ => Err(ScheduleError::InvalidField {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// One identifier bound to one publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// 13-digit identifier, primary key
    pub identifier: String,

    /// External book reference, unique among assignments
    pub book_ref: String,

    /// Publication title
    pub title: String,

    /// Planned publication date
    pub scheduled_date: NaiveDate,

    /// Date the identifier was activated, once assigned
    #[serde(default)]
    pub assigned_date: Option<NaiveDate>,

    /// Lifecycle status
    pub status: AssignmentStatus,

    /// Imprint the book is published under
    #[serde(default)]
    pub imprint: Option<String>,

    /// Publisher name
    #[serde(default)]
    pub publisher: Option<String>,

    /// Format, e.g. paperback or ebook
    #[serde(default)]
    pub format: Option<String>,

    /// Relative priority, 1 by default
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Free-text notes
    #[serde(default)]
    pub notes: String,
}

fn default_priority() -> u32 {
    DEFAULT_PRIORITY
}

impl Assignment {
    /// Build a new record from a request.
    #[must_use]
    pub fn from_request(
        identifier: String,
        request: &ScheduleRequest,
        status: AssignmentStatus,
        assigned_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            identifier,
            book_ref: request.book_ref.clone(),
            title: request.title.clone(),
            scheduled_date: request.scheduled_date,
            assigned_date,
            status,
            imprint: request.imprint.clone(),
            publisher: request.publisher.clone(),
            format: request.format.clone(),
            priority: request.priority.unwrap_or(DEFAULT_PRIORITY),
            notes: request.notes.clone().unwrap_or_default(),
        }
    }

    /// Apply a partial update. Returns true if any field changed.
    pub fn apply(&mut self, update: &AssignmentUpdate) -> bool {
        let before = self.clone();
        if let Some(title) = &update.title {
            self.title.clone_from(title);
        }
        if let Some(date) = update.scheduled_date {
            self.scheduled_date = date;
        }
        if let Some(imprint) = &update.imprint {
            self.imprint = Some(imprint.clone());
        }
        if let Some(publisher) = &update.publisher {
            self.publisher = Some(publisher.clone());
        }
        if let Some(format) = &update.format {
            self.format = Some(format.clone());
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(notes) = &update.notes {
            self.notes.clone_from(notes);
        }
        *self != before
    }

    /// Append a line to the notes.
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    /// Case-insensitive substring match against title, book reference or
    /// identifier. `needle` must already be lower-case.
    #[must_use]
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.book_ref.to_lowercase().contains(needle)
            || self.identifier.contains(needle)
    }
}

/// Partial update of the mutable, non-status fields of an assignment.
///
/// `None` leaves a field untouched. Status can only be changed through the
/// dedicated scheduler operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    /// New title
    pub title: Option<String>,
    /// New scheduled date
    pub scheduled_date: Option<NaiveDate>,
    /// New imprint
    pub imprint: Option<String>,
    /// New publisher
    pub publisher: Option<String>,
    /// New format
    pub format: Option<String>,
    /// New priority
    pub priority: Option<u32>,
    /// Replacement notes
    pub notes: Option<String>,
}

impl AssignmentUpdate {
    /// An update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the scheduled date.
    #[must_use]
    pub fn with_scheduled_date(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    /// Sets the imprint.
    #[must_use]
    pub fn with_imprint(mut self, imprint: impl Into<String>) -> Self {
        self.imprint = Some(imprint.into());
        self
    }

    /// Sets the publisher.
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Sets the format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything needed to schedule or register a publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Publication title
    pub title: String,
    /// External book reference
    pub book_ref: String,
    /// Planned publication date
    pub scheduled_date: NaiveDate,
    /// Imprint
    pub imprint: Option<String>,
    /// Publisher
    pub publisher: Option<String>,
    /// Format
    pub format: Option<String>,
    /// Priority, [`DEFAULT_PRIORITY`] when absent
    pub priority: Option<u32>,
    /// Notes, empty when absent
    pub notes: Option<String>,
}

impl ScheduleRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        book_ref: impl Into<String>,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            book_ref: book_ref.into(),
            scheduled_date,
            imprint: None,
            publisher: None,
            format: None,
            priority: None,
            notes: None,
        }
    }

    /// Sets the imprint.
    #[must_use]
    pub fn with_imprint(mut self, imprint: impl Into<String>) -> Self {
        self.imprint = Some(imprint.into());
        self
    }

    /// Sets the publisher.
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Sets the format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Reject requests without a title or book reference.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingField`] naming the empty field.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.title.trim().is_empty() {
            return Err(ScheduleError::MissingField { field: "title" });
        }
        if self.book_ref.trim().is_empty() {
            return Err(ScheduleError::MissingField { field: "book_ref" });
        }
        Ok(())
    }

    /// The update that refreshes an existing record with this request's
    /// values. Title and date are always carried; optional fields only when
    /// present.
    #[must_use]
    pub fn as_update(&self) -> AssignmentUpdate {
        AssignmentUpdate {
            title: Some(self.title.clone()),
            scheduled_date: Some(self.scheduled_date),
            imprint: self.imprint.clone(),
            publisher: self.publisher.clone(),
            format: self.format.clone(),
            priority: self.priority,
            notes: self.notes.clone(),
        }
    }
}
