//! Indexed collection of assignment records.
//!
//! Records are keyed by identifier. A secondary index maps each book
//! reference to its identifier so lookups by book are O(1). The store is
//! append/update only; nothing here removes a record.

use super::assignment::{Assignment, AssignmentStatus, AssignmentUpdate};
use super::error::ScheduleError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Assignment records with a book-reference index.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    /// Records indexed by identifier
    by_identifier: BTreeMap<String, Assignment>,
    /// Book reference → identifier
    by_book_ref: HashMap<String, String>,
}

impl AssignmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted records.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate identifier or book reference found, as in
    /// [`create`](Self::create).
    pub fn from_records(records: Vec<Assignment>) -> Result<Self, ScheduleError> {
        let mut store = Self::new();
        for record in records {
            store.create(record)?;
        }
        Ok(store)
    }

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Conflict`] when the identifier is taken and
    /// [`ScheduleError::BookAlreadyAssigned`] when the book reference is.
    pub fn create(&mut self, assignment: Assignment) -> Result<&Assignment, ScheduleError> {
        if let Some(existing) = self.by_identifier.get(&assignment.identifier) {
            return Err(ScheduleError::Conflict {
                identifier: assignment.identifier.clone(),
                owner: existing.book_ref.clone(),
                requested: assignment.book_ref.clone(),
            });
        }
        if let Some(owned) = self.by_book_ref.get(&assignment.book_ref) {
            return Err(ScheduleError::BookAlreadyAssigned {
                book_ref: assignment.book_ref.clone(),
                identifier: owned.clone(),
            });
        }

        trace!(
            "indexing {} under book {}",
            assignment.identifier, assignment.book_ref
        );
        let identifier = assignment.identifier.clone();
        self.by_book_ref
            .insert(assignment.book_ref.clone(), identifier.clone());
        Ok(self.by_identifier.entry(identifier).or_insert(assignment))
    }

    /// Look up a record by identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&Assignment> {
        self.by_identifier.get(identifier)
    }

    /// Look up a record by book reference.
    #[must_use]
    pub fn get_by_book_ref(&self, book_ref: &str) -> Option<&Assignment> {
        self.by_book_ref
            .get(book_ref)
            .and_then(|identifier| self.by_identifier.get(identifier))
    }

    /// Whether the identifier is present.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    /// Apply a partial field update. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] for an unknown identifier.
    pub fn update(
        &mut self,
        identifier: &str,
        update: &AssignmentUpdate,
    ) -> Result<bool, ScheduleError> {
        let record = self.record_mut(identifier)?;
        Ok(record.apply(update))
    }

    /// Move a record to `status`, enforcing the lifecycle rules.
    ///
    /// `assigned_date` is stamped when moving to [`AssignmentStatus::Assigned`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] for an unknown identifier and
    /// [`ScheduleError::InvalidTransition`] when the move is not allowed.
    pub fn transition(
        &mut self,
        identifier: &str,
        status: AssignmentStatus,
        assigned_date: Option<NaiveDate>,
    ) -> Result<&Assignment, ScheduleError> {
        let record = self.record_mut(identifier)?;
        if !record.status.can_transition_to(status) {
            return Err(ScheduleError::InvalidTransition {
                identifier: identifier.to_string(),
                from: record.status,
                to: status,
            });
        }
        record.status = status;
        if status == AssignmentStatus::Assigned {
            record.assigned_date = assigned_date;
        }
        Ok(record)
    }

    /// Append a line to a record's notes.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] for an unknown identifier.
    pub fn append_note(&mut self, identifier: &str, note: &str) -> Result<(), ScheduleError> {
        self.record_mut(identifier)?.append_note(note);
        Ok(())
    }

    /// Iterate records ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.by_identifier.values()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    /// True when the store holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    /// Count records per status, including zero counts.
    #[must_use]
    pub fn count_by_status(&self) -> BTreeMap<AssignmentStatus, usize> {
        let mut counts: BTreeMap<AssignmentStatus, usize> =
            AssignmentStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for record in self.by_identifier.values() {
            *counts.entry(record.status).or_default() += 1;
        }
        counts
    }

    fn record_mut(&mut self, identifier: &str) -> Result<&mut Assignment, ScheduleError> {
        self.by_identifier
            .get_mut(identifier)
            .ok_or_else(|| ScheduleError::NotFound {
                key: identifier.to_string(),
            })
    }
}
