//! Bulk import and export.
//!
//! Rows come from CSV (header row required) or from a JSON array of
//! objects, both using the same column names:
//!
//! `title, book_ref, scheduled_date, identifier, imprint, publisher, format, priority, notes`
//!
//! Every value is read as text so identifiers and registrant codes keep
//! their leading zeros. A row is converted to a typed [`ScheduleRequest`]
//! before it reaches the scheduler. A bad row is skipped and reported in
//! [`ImportResult::errors`]; the rest of the batch still goes through.

use super::assignment::{Assignment, ScheduleRequest};
use super::checksum::normalize_identifier;
use super::error::ScheduleError;
use super::service::{IsbnScheduler, UpsertOutcome};
use crate::utils::parse_date;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Column order shared by templates and exports.
pub const IMPORT_COLUMNS: [&str; 9] = [
    "title",
    "book_ref",
    "scheduled_date",
    "identifier",
    "imprint",
    "publisher",
    "format",
    "priority",
    "notes",
];

/// One raw row of an import source. Empty strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportRecord {
    /// Publication title, required
    pub title: String,
    /// External book reference, required
    pub book_ref: String,
    /// `YYYY-MM-DD`, required
    pub scheduled_date: String,
    /// Blank to auto-draw, otherwise a full 13-digit identifier
    pub identifier: String,
    /// Imprint
    pub imprint: String,
    /// Publisher
    pub publisher: String,
    /// Format
    pub format: String,
    /// Unsigned integer priority
    pub priority: String,
    /// Free-text notes
    pub notes: String,
}

impl ImportRecord {
    /// Convert to a typed request, leaving the identifier aside.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::MissingField`] for a blank title, book reference or
    /// date, [`ScheduleError::InvalidDate`] and
    /// [`ScheduleError::InvalidField`] for unparsable values.
    pub fn to_request(&self) -> Result<ScheduleRequest, ScheduleError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ScheduleError::MissingField { field: "title" });
        }
        let book_ref = self.book_ref.trim();
        if book_ref.is_empty() {
            return Err(ScheduleError::MissingField { field: "book_ref" });
        }
        let date = self.scheduled_date.trim();
        if date.is_empty() {
            return Err(ScheduleError::MissingField {
                field: "scheduled_date",
            });
        }
        let scheduled_date = parse_date(date).ok_or_else(|| ScheduleError::InvalidDate {
            value: date.to_string(),
        })?;

        let mut request = ScheduleRequest::new(title, book_ref, scheduled_date);
        request.imprint = non_blank(&self.imprint);
        request.publisher = non_blank(&self.publisher);
        request.format = non_blank(&self.format);
        request.notes = non_blank(&self.notes);
        request.priority = match non_blank(&self.priority) {
            Some(raw) => Some(raw.parse().map_err(|_| ScheduleError::InvalidField {
                field: "priority",
                value: raw,
            })?),
            None => None,
        };
        Ok(request)
    }

    /// The identifier column, normalized, or `None` when blank.
    #[must_use]
    pub fn manual_identifier(&self) -> Option<String> {
        non_blank(&self.identifier).map(|raw| normalize_identifier(&raw))
    }

    fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        let field = |name: &str| match object.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Self {
            title: field("title"),
            book_ref: field("book_ref"),
            scheduled_date: field("scheduled_date"),
            identifier: field("identifier"),
            imprint: field("imprint"),
            publisher: field("publisher"),
            format: field("format"),
            priority: field("priority"),
            notes: field("notes"),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Rows applied successfully
    pub processed: usize,
    /// New records created from a supplied identifier
    pub assigned_manual: usize,
    /// New records created with an auto-drawn identifier
    pub assigned_auto: usize,
    /// Existing records refreshed
    pub updated: usize,
    /// One message per rejected row, `row N: reason`
    pub errors: Vec<String>,
}

impl ImportResult {
    /// True when every row went through.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn reject(&mut self, row: usize, err: &ScheduleError) {
        warn!("import row {} rejected: {}", row, err);
        self.errors.push(format!("row {row}: {err}"));
    }
}

/// A parsed source: rows that decoded, plus per-row decode failures.
type ParsedRows = Vec<(usize, Result<ImportRecord, ScheduleError>)>;

fn read_csv_rows<R: Read>(reader: R) -> ParsedRows {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    csv_reader
        .deserialize::<ImportRecord>()
        .enumerate()
        .map(|(index, row)| (index + 1, row.map_err(ScheduleError::from)))
        .collect()
}

fn read_json_rows<R: Read>(reader: R) -> Result<ParsedRows, ScheduleError> {
    let document: Value =
        serde_json::from_reader(reader).map_err(|e| ScheduleError::Deserialization {
            message: e.to_string(),
        })?;
    let Value::Array(items) = document else {
        return Err(ScheduleError::Deserialization {
            message: "expected a JSON array of row objects".to_string(),
        });
    };
    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let row = match item {
                Value::Object(object) => Ok(ImportRecord::from_json_object(object)),
                _ => Err(ScheduleError::Deserialization {
                    message: "row is not an object".to_string(),
                }),
            };
            (index + 1, row)
        })
        .collect())
}

fn read_rows_from_path(path: &Path) -> Result<ParsedRows, ScheduleError> {
    let file = File::open(path).map_err(|e| ScheduleError::io(e, path))?;
    if is_json_path(path) {
        read_json_rows(file)
    } else {
        Ok(read_csv_rows(file))
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> ScheduleError {
    ScheduleError::Serialization {
        message: format!("{}: {err}", path.display()),
    }
}

impl IsbnScheduler {
    /// Import rows from a file, CSV or JSON by extension.
    ///
    /// # Errors
    ///
    /// Only source-level failures (unreadable file, malformed JSON document)
    /// and a failed final save are returned as errors. Row problems are
    /// collected in the result.
    pub fn import_schedule(&mut self, path: impl AsRef<Path>) -> Result<ImportResult, ScheduleError> {
        let path = path.as_ref();
        info!("Importing schedule from {}", path.display());
        let rows = read_rows_from_path(path)?;
        self.import_rows(rows)
    }

    /// Import rows from CSV text.
    ///
    /// # Errors
    ///
    /// See [`import_schedule`](Self::import_schedule).
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportResult, ScheduleError> {
        self.import_rows(read_csv_rows(reader))
    }

    /// Import rows from a JSON array of objects.
    ///
    /// # Errors
    ///
    /// See [`import_schedule`](Self::import_schedule).
    pub fn import_json<R: Read>(&mut self, reader: R) -> Result<ImportResult, ScheduleError> {
        let rows = read_json_rows(reader)?;
        self.import_rows(rows)
    }

    /// Import already-decoded records.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the final save fails.
    pub fn import_records(
        &mut self,
        records: impl IntoIterator<Item = ImportRecord>,
    ) -> Result<ImportResult, ScheduleError> {
        self.import_rows(
            records
                .into_iter()
                .enumerate()
                .map(|(index, record)| (index + 1, Ok(record)))
                .collect(),
        )
    }

    fn import_rows(&mut self, rows: ParsedRows) -> Result<ImportResult, ScheduleError> {
        let mut result = ImportResult::default();
        let mut seen = HashSet::new();

        for (row, record) in rows {
            let outcome = record.and_then(|record| self.import_one(&record, &mut seen));
            match outcome {
                Ok((manual, UpsertOutcome::Created)) => {
                    result.processed += 1;
                    if manual {
                        result.assigned_manual += 1;
                    } else {
                        result.assigned_auto += 1;
                    }
                }
                Ok((_, UpsertOutcome::Updated)) => {
                    result.processed += 1;
                    result.updated += 1;
                }
                Err(e) => result.reject(row, &e),
            }
        }

        if result.processed > 0 {
            self.persist()?;
        }
        info!(
            "Import finished: {} processed ({} manual, {} auto, {} updated), {} errors",
            result.processed,
            result.assigned_manual,
            result.assigned_auto,
            result.updated,
            result.errors.len()
        );
        Ok(result)
    }

    /// Apply one row. Returns whether the identifier was supplied, and the
    /// outcome.
    fn import_one(
        &mut self,
        record: &ImportRecord,
        seen: &mut HashSet<String>,
    ) -> Result<(bool, UpsertOutcome), ScheduleError> {
        let manual = record.manual_identifier();
        if let Some(identifier) = &manual {
            if seen.contains(identifier) {
                return Err(ScheduleError::invalid_identifier(
                    identifier,
                    "duplicate identifier in batch",
                ));
            }
        }
        let request = record.to_request()?;

        match manual {
            Some(identifier) => {
                let outcome = self.assign_specific_inner(&identifier, &request)?;
                // only rows that were applied claim their identifier
                seen.insert(identifier);
                Ok((true, outcome))
            }
            None => {
                let (identifier, outcome) = self.get_or_assign_inner(&request)?;
                debug!("row for {} resolved to {}", request.book_ref, identifier);
                Ok((false, outcome))
            }
        }
    }

    /// Schedule one new identifier per row of a CSV or JSON file, ignoring
    /// any identifier column. Returns how many were scheduled.
    ///
    /// # Errors
    ///
    /// Source-level failures and a failed final save.
    pub fn bulk_schedule(&mut self, path: impl AsRef<Path>) -> Result<usize, ScheduleError> {
        let path = path.as_ref();
        info!("Bulk scheduling from {}", path.display());
        let records = read_rows_from_path(path)?
            .into_iter()
            .filter_map(|(row, record)| {
                record
                    .inspect_err(|e| warn!("bulk row {} unreadable: {}", row, e))
                    .ok()
            });
        self.bulk_schedule_records(records)
    }

    /// Schedule one new identifier per record. Rows that fail validation or
    /// whose book already holds an identifier are skipped with a warning.
    /// Stops early once every block is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the final save fails.
    pub fn bulk_schedule_records(
        &mut self,
        records: impl IntoIterator<Item = ImportRecord>,
    ) -> Result<usize, ScheduleError> {
        let mut scheduled = 0;
        for (index, record) in records.into_iter().enumerate() {
            let attempt = record
                .to_request()
                .and_then(|request| self.schedule_inner(&request));
            match attempt {
                Ok(_) => scheduled += 1,
                Err(e) if e.is_capacity_exhausted() => {
                    warn!("bulk scheduling stopped at row {}: {}", index + 1, e);
                    break;
                }
                Err(e) => warn!("bulk row {} skipped: {}", index + 1, e),
            }
        }
        if scheduled > 0 {
            self.persist()?;
        }
        info!("Bulk scheduled {} identifiers", scheduled);
        Ok(scheduled)
    }

    /// Write an example import file showing a manual row and an auto-draw
    /// row. JSON when `destination` ends in `.json`, CSV otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_template(&self, destination: impl AsRef<Path>) -> Result<(), ScheduleError> {
        let destination = destination.as_ref();
        let rows = template_rows();
        if is_json_path(destination) {
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| write_error(destination, e))?;
            fs::write(destination, json).map_err(|e| ScheduleError::io(e, destination))?;
        } else {
            let mut writer =
                csv::Writer::from_path(destination).map_err(|e| write_error(destination, e))?;
            for row in &rows {
                writer
                    .serialize(row)
                    .map_err(|e| write_error(destination, e))?;
            }
            writer
                .flush()
                .map_err(|e| ScheduleError::io(e, destination))?;
        }
        info!("Wrote import template to {}", destination.display());
        Ok(())
    }

    /// Write every assignment as CSV: the import columns followed by
    /// `status` and `assigned_date`. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_assignments(&self, destination: impl AsRef<Path>) -> Result<usize, ScheduleError> {
        let destination = destination.as_ref();
        let file = File::create(destination).map_err(|e| ScheduleError::io(e, destination))?;
        let count = write_assignments(file, self.assignments())
            .map_err(|e| write_error(destination, e))?;
        info!(
            "Exported {} assignments to {}",
            count,
            destination.display()
        );
        Ok(count)
    }
}

/// Two rows: one registering a specific identifier, one left blank for
/// automatic drawing.
fn template_rows() -> Vec<ImportRecord> {
    vec![
        ImportRecord {
            title: "Example Manual Title".to_string(),
            book_ref: "manual-001".to_string(),
            scheduled_date: "2025-01-15".to_string(),
            identifier: "9781234567897".to_string(),
            imprint: "Main Imprint".to_string(),
            publisher: "Example Press".to_string(),
            format: "paperback".to_string(),
            priority: "1".to_string(),
            notes: "Identifier supplied by hand".to_string(),
        },
        ImportRecord {
            title: "Example Auto Title".to_string(),
            book_ref: "auto-001".to_string(),
            scheduled_date: "2025-02-01".to_string(),
            identifier: String::new(),
            imprint: "Main Imprint".to_string(),
            publisher: "Example Press".to_string(),
            format: "ebook".to_string(),
            priority: "2".to_string(),
            notes: "Leave identifier blank to draw from a block".to_string(),
        },
    ]
}

fn write_assignments<'a, W: Write>(
    sink: W,
    assignments: impl Iterator<Item = &'a Assignment>,
) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(sink);
    let mut header: Vec<&str> = IMPORT_COLUMNS.to_vec();
    header.extend(["status", "assigned_date"]);
    writer.write_record(&header)?;

    let mut count = 0;
    for a in assignments {
        let scheduled = a.scheduled_date.format("%Y-%m-%d").to_string();
        let priority = a.priority.to_string();
        let assigned = a
            .assigned_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        writer.write_record([
            a.title.as_str(),
            a.book_ref.as_str(),
            scheduled.as_str(),
            a.identifier.as_str(),
            a.imprint.as_deref().unwrap_or(""),
            a.publisher.as_deref().unwrap_or(""),
            a.format.as_deref().unwrap_or(""),
            priority.as_str(),
            a.notes.as_str(),
            a.status.as_str(),
            assigned.as_str(),
        ])?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}
