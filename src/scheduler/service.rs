/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! The scheduler service: the one entry point other subsystems call.
//!
//! [`IsbnScheduler`] owns the [`BlockRegistry`], the [`AssignmentStore`] and a
//! [`SnapshotStore`]. Every mutating call writes a full snapshot before it
//! returns, so a second scheduler opened on the same storage observes the
//! same state. When that write fails the in-memory change stands and the
//! storage error is returned to the caller.
//!
//! Single-record operations come in two flavours: a plain form returning
//! `bool` / `Option` so callers can branch without error handling, and a
//! `try_*` form returning the [`ScheduleError`] that explains a failure.

use super::assignment::{Assignment, AssignmentStatus, AssignmentUpdate, ScheduleRequest};
use super::block::{Block, BlockId, BlockRegistry};
use super::checksum::{normalize_identifier, validate_identifier};
use super::config::SchedulerConfig;
use super::error::ScheduleError;
use super::persistence::{FileStore, MemoryStore, SchedulerSnapshot, SnapshotStore};
use super::report::AvailabilityReport;
use super::store::AssignmentStore;
use crate::utils::{current_time_millis, today};
use chrono::{Days, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Whether an upsert created a new record or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was created
    Created,
    /// An existing record was updated in place
    Updated,
}

/// Allocates, tracks and persists identifiers.
#[derive(Debug)]
pub struct IsbnScheduler {
    /// Inventory blocks
    registry: BlockRegistry,
    /// Assignment records
    store: AssignmentStore,
    /// Where snapshots go
    storage: Box<dyn SnapshotStore>,
    /// Runtime configuration
    config: SchedulerConfig,
}

impl IsbnScheduler {
    /// Create a scheduler from a configuration. A configured storage path
    /// selects a [`FileStore`]; otherwise state is kept in memory.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        let storage: Box<dyn SnapshotStore> = match &config.storage_path {
            Some(path) => Box::new(FileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        };
        Self::with_store(storage, config)
    }

    /// Open a scheduler persisted to the JSON file at `path`.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(SchedulerConfig::new().with_storage_path(path))
    }

    /// A scheduler that keeps its state in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(SchedulerConfig::new())
    }

    /// Create a scheduler on top of any storage backend.
    ///
    /// Existing state is loaded immediately. A missing document starts
    /// empty; an unreadable or corrupt one starts empty and logs a warning.
    #[must_use]
    pub fn with_store(storage: Box<dyn SnapshotStore>, config: SchedulerConfig) -> Self {
        let (registry, store) = match Self::load_state(storage.as_ref()) {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("No saved state at {}, starting empty", storage.location());
                (BlockRegistry::new(), AssignmentStore::new())
            }
            Err(e) => {
                warn!(
                    "Could not load state from {}: {}. Starting empty",
                    storage.location(),
                    e
                );
                (BlockRegistry::new(), AssignmentStore::new())
            }
        };
        info!(
            "Scheduler ready with {} blocks and {} assignments",
            registry.len(),
            store.len()
        );

        Self {
            registry,
            store,
            storage,
            config,
        }
    }

    fn load_state(
        storage: &dyn SnapshotStore,
    ) -> Result<Option<(BlockRegistry, AssignmentStore)>, ScheduleError> {
        match storage.load()? {
            Some(snapshot) => {
                let registry = BlockRegistry::from_blocks(snapshot.blocks)?;
                let store = AssignmentStore::from_records(snapshot.assignments)?;
                Ok(Some((registry, store)))
            }
            None => Ok(None),
        }
    }

    /// Re-read the storage, replacing in-memory state. On error the current
    /// state is kept.
    ///
    /// # Errors
    ///
    /// Returns the load or validation error.
    pub fn reload(&mut self) -> Result<(), ScheduleError> {
        let (registry, store) = Self::load_state(self.storage.as_ref())?
            .unwrap_or_else(|| (BlockRegistry::new(), AssignmentStore::new()));
        self.registry = registry;
        self.store = store;
        debug!("reloaded state from {}", self.storage.location());
        Ok(())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current state as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            blocks: self.registry.blocks().to_vec(),
            assignments: self.store.iter().cloned().collect(),
            timestamp: current_time_millis(),
        }
    }

    /// Write the full snapshot now, regardless of `persist_on_mutation`.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub fn save(&self) -> Result<(), ScheduleError> {
        self.storage.save(&self.snapshot()).inspect_err(|e| {
            error!("Failed to save state to {}: {}", self.storage.location(), e);
        })
    }

    /// Persist after a mutation when configured to.
    pub(crate) fn persist(&self) -> Result<(), ScheduleError> {
        if self.config.persist_on_mutation {
            self.save()?;
        }
        publish_available(self.registry.total_available());
        Ok(())
    }

    // ─── Blocks ─────────────────────────────────────────────────────────────

    /// Register a block of sequence numbers.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidBlock`] for a malformed or overlapping
    /// range, or the storage error if persisting fails.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn add_block(
        &mut self,
        prefix: &str,
        start: u64,
        end: u64,
        registrant_code: &str,
        imprint: Option<String>,
    ) -> Result<BlockId, ScheduleError> {
        let id = self
            .registry
            .add_block(prefix, start, end, registrant_code, imprint)?;
        self.persist()?;
        Ok(id)
    }

    /// Register a block under the configured default prefix.
    ///
    /// # Errors
    ///
    /// Same as [`add_block`](Self::add_block).
    pub fn add_default_block(
        &mut self,
        start: u64,
        end: u64,
        registrant_code: &str,
        imprint: Option<String>,
    ) -> Result<BlockId, ScheduleError> {
        let prefix = self.config.default_prefix.clone();
        self.add_block(&prefix, start, end, registrant_code, imprint)
    }

    /// All blocks in registration order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        self.registry.blocks()
    }

    /// The block an identifier belongs to, by prefix and registrant code.
    #[must_use]
    pub fn block_for_identifier(&self, identifier: &str) -> Option<&Block> {
        self.registry.block_for_identifier(identifier)
    }

    // ─── Scheduling ─────────────────────────────────────────────────────────

    /// Draw an identifier from the first block with capacity and record a
    /// SCHEDULED assignment for the book.
    ///
    /// Returns `None` when no block has capacity or the request is rejected.
    pub fn schedule(&mut self, request: ScheduleRequest) -> Option<String> {
        report_failure("schedule", self.try_schedule(request))
    }

    /// [`schedule`](Self::schedule) with the failure reason.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::CapacityExhausted`] when every block is full,
    /// [`ScheduleError::MissingField`] for an incomplete request and
    /// [`ScheduleError::BookAlreadyAssigned`] when the book already holds an
    /// identifier.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_schedule(&mut self, request: ScheduleRequest) -> Result<String, ScheduleError> {
        let identifier = self.schedule_inner(&request)?;
        self.persist()?;
        Ok(identifier)
    }

    pub(crate) fn schedule_inner(
        &mut self,
        request: &ScheduleRequest,
    ) -> Result<String, ScheduleError> {
        request.validate()?;
        if let Some(existing) = self.store.get_by_book_ref(&request.book_ref) {
            return Err(ScheduleError::BookAlreadyAssigned {
                book_ref: request.book_ref.clone(),
                identifier: existing.identifier.clone(),
            });
        }

        let identifier = self.draw_unused_identifier()?;
        let record = Assignment::from_request(
            identifier.clone(),
            &self.with_defaults(request),
            AssignmentStatus::Scheduled,
            None,
        );
        self.store.create(record)?;

        info!(
            "Scheduled {} for {} ({}) on {}",
            identifier, request.book_ref, request.title, request.scheduled_date
        );
        count_event("isbn_scheduler.scheduled");
        Ok(identifier)
    }

    /// Draw until an identifier not already registered by hand comes up.
    /// Numbers skipped this way stay consumed.
    fn draw_unused_identifier(&mut self) -> Result<String, ScheduleError> {
        loop {
            let (block, identifier) = self.registry.draw_identifier().inspect_err(|e| {
                if e.is_capacity_exhausted() {
                    warn!("No block has remaining capacity; provision a new block");
                    count_event("isbn_scheduler.capacity_exhausted");
                }
            })?;
            if !self.store.contains(&identifier) {
                debug!("drew {} from block {}", identifier, block);
                return Ok(identifier);
            }
            warn!(
                "Drawn identifier {} is already registered; skipping it",
                identifier
            );
        }
    }

    fn with_defaults(&self, request: &ScheduleRequest) -> ScheduleRequest {
        let mut request = request.clone();
        if request.publisher.is_none() {
            request.publisher.clone_from(&self.config.default_publisher);
        }
        if request.format.is_none() {
            request.format.clone_from(&self.config.default_format);
        }
        request
    }

    /// Activate an identifier: SCHEDULED or RESERVED → ASSIGNED, stamping
    /// today's date. Returns `false` for an unknown identifier or a record
    /// that is already assigned.
    pub fn assign_now(&mut self, identifier: &str) -> bool {
        report_failure("assign_now", self.try_assign_now(identifier)).is_some()
    }

    /// [`assign_now`](Self::assign_now) with the failure reason.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::NotFound`] or [`ScheduleError::InvalidTransition`].
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_assign_now(&mut self, identifier: &str) -> Result<&Assignment, ScheduleError> {
        self.store
            .transition(identifier, AssignmentStatus::Assigned, Some(today()))?;
        info!("Assigned {}", identifier);
        count_event("isbn_scheduler.assigned");
        self.persist()?;
        self.store.get(identifier).ok_or_else(|| ScheduleError::NotFound {
            key: identifier.to_string(),
        })
    }

    /// Register a specific, externally chosen identifier as ASSIGNED.
    ///
    /// An unused identifier is created. One already held by the same book
    /// reference is updated in place. One held by a different book reference
    /// is rejected and left untouched.
    pub fn assign_specific(&mut self, identifier: &str, request: ScheduleRequest) -> bool {
        report_failure(
            "assign_specific",
            self.try_assign_specific(identifier, request),
        )
        .is_some()
    }

    /// [`assign_specific`](Self::assign_specific) with the outcome or the
    /// failure reason.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::InvalidIdentifier`], [`ScheduleError::MissingField`],
    /// [`ScheduleError::Conflict`] when another book owns the identifier and
    /// [`ScheduleError::BookAlreadyAssigned`] when the book holds a different
    /// identifier.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_assign_specific(
        &mut self,
        identifier: &str,
        request: ScheduleRequest,
    ) -> Result<UpsertOutcome, ScheduleError> {
        let outcome = self.assign_specific_inner(identifier, &request)?;
        self.persist()?;
        Ok(outcome)
    }

    pub(crate) fn assign_specific_inner(
        &mut self,
        identifier: &str,
        request: &ScheduleRequest,
    ) -> Result<UpsertOutcome, ScheduleError> {
        let identifier = normalize_identifier(identifier);
        validate_identifier(&identifier)?;
        request.validate()?;

        if let Some(existing) = self.store.get(&identifier) {
            if existing.book_ref != request.book_ref {
                return Err(ScheduleError::Conflict {
                    identifier,
                    owner: existing.book_ref.clone(),
                    requested: request.book_ref.clone(),
                });
            }
            self.store.update(&identifier, &request.as_update())?;
            debug!("refreshed {} for {}", identifier, request.book_ref);
            return Ok(UpsertOutcome::Updated);
        }

        if let Some(held) = self.store.get_by_book_ref(&request.book_ref) {
            return Err(ScheduleError::BookAlreadyAssigned {
                book_ref: request.book_ref.clone(),
                identifier: held.identifier.clone(),
            });
        }

        let record = Assignment::from_request(
            identifier.clone(),
            &self.with_defaults(request),
            AssignmentStatus::Assigned,
            Some(today()),
        );
        self.store.create(record)?;
        info!(
            "Assigned specific identifier {} to {} ({})",
            identifier, request.book_ref, request.title
        );
        count_event("isbn_scheduler.assigned");
        Ok(UpsertOutcome::Created)
    }

    /// Return the identifier already held by the book, refreshing its fields,
    /// or schedule a new one. Repeated calls for the same book reference never
    /// allocate a second identifier.
    ///
    /// Returns `None` only when a new identifier was needed and none could be
    /// drawn.
    pub fn get_or_assign(&mut self, request: ScheduleRequest) -> Option<String> {
        report_failure("get_or_assign", self.try_get_or_assign(request))
    }

    /// [`get_or_assign`](Self::get_or_assign) with the failure reason.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::MissingField`] for an incomplete request and
    /// [`ScheduleError::CapacityExhausted`] when a new identifier is needed
    /// but every block is full.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_get_or_assign(&mut self, request: ScheduleRequest) -> Result<String, ScheduleError> {
        let (identifier, _) = self.get_or_assign_inner(&request)?;
        self.persist()?;
        Ok(identifier)
    }

    pub(crate) fn get_or_assign_inner(
        &mut self,
        request: &ScheduleRequest,
    ) -> Result<(String, UpsertOutcome), ScheduleError> {
        request.validate()?;
        if let Some(existing) = self.store.get_by_book_ref(&request.book_ref) {
            let identifier = existing.identifier.clone();
            let changed = self.store.update(&identifier, &request.as_update())?;
            debug!(
                "book {} already holds {} (fields changed: {})",
                request.book_ref, identifier, changed
            );
            return Ok((identifier, UpsertOutcome::Updated));
        }
        let identifier = self.schedule_inner(request)?;
        Ok((identifier, UpsertOutcome::Created))
    }

    /// Set an identifier aside: status becomes RESERVED and `reason` is
    /// appended to the notes.
    pub fn reserve(&mut self, identifier: &str, reason: &str) -> bool {
        report_failure("reserve", self.try_reserve(identifier, reason)).is_some()
    }

    /// [`reserve`](Self::reserve) with the failure reason.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::NotFound`] or [`ScheduleError::InvalidTransition`]
    /// for an assigned record.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_reserve(&mut self, identifier: &str, reason: &str) -> Result<(), ScheduleError> {
        self.store
            .transition(identifier, AssignmentStatus::Reserved, None)?;
        self.store.append_note(identifier, reason)?;
        info!("Reserved {}: {}", identifier, reason);
        count_event("isbn_scheduler.reserved");
        self.persist()
    }

    /// Return a RESERVED identifier to the normal flow (SCHEDULED).
    pub fn release(&mut self, identifier: &str) -> bool {
        report_failure("release", self.try_release(identifier)).is_some()
    }

    /// [`release`](Self::release) with the failure reason.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::NotFound`] or [`ScheduleError::InvalidTransition`]
    /// unless the record is RESERVED.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_release(&mut self, identifier: &str) -> Result<(), ScheduleError> {
        self.store
            .transition(identifier, AssignmentStatus::Scheduled, None)?;
        info!("Released {} back to scheduled", identifier);
        self.persist()
    }

    /// Partially update the mutable, non-status fields of a record.
    pub fn update(&mut self, identifier: &str, update: &AssignmentUpdate) -> bool {
        report_failure("update", self.try_update(identifier, update)).is_some()
    }

    /// [`update`](Self::update) returning whether any field changed.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::NotFound`] for an unknown identifier.
    ///
    /// A storage error is returned after the in-memory change has been
    /// applied; the change is kept and [`save`](Self::save) can be retried.
    pub fn try_update(
        &mut self,
        identifier: &str,
        update: &AssignmentUpdate,
    ) -> Result<bool, ScheduleError> {
        let changed = self.store.update(identifier, update)?;
        if changed {
            debug!("updated fields of {}", identifier);
            self.persist()?;
        }
        Ok(changed)
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// Look up a record by identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&Assignment> {
        self.store.get(identifier)
    }

    /// Look up a record by book reference.
    #[must_use]
    pub fn get_by_book_ref(&self, book_ref: &str) -> Option<&Assignment> {
        self.store.get_by_book_ref(book_ref)
    }

    /// All records, ordered by identifier.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.store.iter()
    }

    /// Records whose scheduled date lies in `start..=end`, any status,
    /// sorted by scheduled date.
    #[must_use]
    pub fn query_scheduled(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> = self
            .store
            .iter()
            .filter(|a| a.scheduled_date >= start && a.scheduled_date <= end)
            .collect();
        sort_by_date(&mut found);
        found
    }

    /// SCHEDULED records due within `days` days of `from`, inclusive.
    #[must_use]
    pub fn query_upcoming(&self, from: NaiveDate, days: u64) -> Vec<&Assignment> {
        let until = from.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        self.query_scheduled(from, until)
            .into_iter()
            .filter(|a| a.status == AssignmentStatus::Scheduled)
            .collect()
    }

    /// Records in the given status, sorted by scheduled date.
    #[must_use]
    pub fn query_by_status(&self, status: AssignmentStatus) -> Vec<&Assignment> {
        let mut found: Vec<&Assignment> =
            self.store.iter().filter(|a| a.status == status).collect();
        sort_by_date(&mut found);
        found
    }

    /// Case-insensitive substring search over title, book reference and
    /// identifier, sorted by scheduled date.
    #[must_use]
    pub fn search(&self, text: &str) -> Vec<&Assignment> {
        let needle = text.trim().to_lowercase();
        let mut found: Vec<&Assignment> = self
            .store
            .iter()
            .filter(|a| a.matches_lowercase(&needle))
            .collect();
        sort_by_date(&mut found);
        found
    }

    /// Capacity, usage and status counts.
    #[must_use]
    pub fn availability_report(&self) -> AvailabilityReport {
        AvailabilityReport::build(&self.registry, &self.store)
    }
}

fn sort_by_date(records: &mut [&Assignment]) {
    records.sort_by(|a, b| {
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
}

/// Log a failed single-record operation and collapse it to an `Option`.
fn report_failure<T>(operation: &str, result: Result<T, ScheduleError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} rejected: {}", operation, e);
            None
        }
    }
}

#[cfg(feature = "metrics")]
fn count_event(name: &'static str) {
    metrics::counter!(name).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
fn count_event(_name: &'static str) {}

#[cfg(feature = "metrics")]
fn publish_available(available: u64) {
    metrics::gauge!("isbn_scheduler.available").set(available as f64);
}

#[cfg(not(feature = "metrics"))]
#[inline]
fn publish_available(_available: u64) {}
