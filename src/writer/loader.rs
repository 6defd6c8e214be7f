use csv::{ReaderBuilder, Trim};
use rusqlite::Connection;
use std::fmt;
use std::fs::File;
use std::path::Path;

use super::reconcile::{row_handler, Decision};
use super::session::Session;
use crate::audit::AuditLog;
use crate::error::{BatchError, FileError};
use crate::parser::{CsvRow, HeaderIndex};
use crate::schema::EntityKind;
use crate::ui::Ui;

/// Outcome counters for one committed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub kind: EntityKind,
    pub inserted: u64,
    pub updated: u64,
    pub duplicates: u64,
}

impl FileReport {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            inserted: 0,
            updated: 0,
            duplicates: 0,
        }
    }

    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Inserted => self.inserted += 1,
            Decision::Updated => self.updated += 1,
            Decision::Duplicate => self.duplicates += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.updated + self.duplicates
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} duplicates",
            self.inserted, self.updated, self.duplicates
        )
    }
}

/// Reports of every committed file, in processing order
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn total(&self) -> u64 {
        self.files.iter().map(FileReport::total).sum()
    }

    pub fn file(&self, kind: EntityKind) -> Option<&FileReport> {
        self.files.iter().find(|r| r.kind == kind)
    }
}

/// Load every CSV file in order, stopping at the first failure
pub fn run_batch(
    session: &mut Session,
    csv_root: &Path,
    audit: &AuditLog,
    ui: &mut impl Ui,
) -> Result<BatchReport, BatchError> {
    // Connection problems abort before any file is touched
    session.connection()?;

    let mut report = BatchReport::default();

    for kind in EntityKind::ALL {
        let path = kind.csv_path(csv_root);
        let conn = session.connection()?;

        match process_file(conn, kind, &path, audit, ui) {
            Ok(file_report) => report.files.push(file_report),
            Err(source) => {
                ui.error("Stopping the run due to an error.");
                return Err(BatchError::File {
                    kind,
                    file: kind.file_name(),
                    source,
                });
            }
        }
    }

    Ok(report)
}

/// Load one CSV file inside its own checkpoint.
///
/// On failure the file's changes are rolled back and one line is appended to
/// the error log before the error is returned.
pub fn process_file(
    conn: &mut Connection,
    kind: EntityKind,
    path: &Path,
    audit: &AuditLog,
    ui: &mut impl Ui,
) -> Result<FileReport, FileError> {
    let file_name = kind.file_name();
    ui.file_started(kind, path);

    let result = load_file(conn, kind, path, audit, ui);

    match &result {
        Ok(report) => ui.file_committed(kind, report),
        Err(e) => {
            ui.error(format!("Error processing {}: {}", file_name, e));
            audit.file_error(&file_name, &e.to_string());
        }
    }

    result
}

fn load_file(
    conn: &mut Connection,
    kind: EntityKind,
    path: &Path,
    audit: &AuditLog,
    ui: &mut impl Ui,
) -> Result<FileReport, FileError> {
    // Nothing to roll back yet if the file cannot be opened
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| FileError::Access {
            path: path.to_path_buf(),
            source,
        })?;

    let mut tx = conn.transaction().map_err(FileError::Checkpoint)?;
    let mut checkpoint = tx
        .savepoint_with_name(format!("Savepoint_{}", kind.schema().source_file))
        .map_err(FileError::Checkpoint)?;

    match reconcile_records(&checkpoint, kind, &mut reader, audit) {
        Ok(report) => {
            checkpoint.commit().map_err(FileError::Commit)?;
            tx.commit().map_err(FileError::Commit)?;
            Ok(report)
        }
        Err(e) => {
            match checkpoint.rollback() {
                Ok(()) => ui.log(format!("Rolled back {}", kind.file_name())),
                // The run is already failing; a broken rollback is only reported
                Err(rollback_err) => ui.error(format!(
                    "Rollback of {} failed: {}",
                    kind.file_name(),
                    rollback_err
                )),
            }
            Err(e)
        }
    }
}

fn reconcile_records(
    conn: &Connection,
    kind: EntityKind,
    reader: &mut csv::Reader<File>,
    audit: &AuditLog,
) -> Result<FileReport, FileError> {
    let headers = reader
        .headers()
        .map(HeaderIndex::new)
        .map_err(|e| FileError::Record {
            line: 1,
            source: e.into(),
        })?;

    let handler = row_handler(kind);
    let mut report = FileReport::new(kind);

    for result in reader.records() {
        let record = result.map_err(|e| FileError::Record {
            line: e.position().map_or(0, |p| p.line()),
            source: e.into(),
        })?;
        let line = record.position().map_or(0, |p| p.line());

        let decision = handler(conn, &CsvRow::new(&headers, &record), audit)
            .map_err(|source| FileError::Record { line, source })?;
        report.record(decision);
    }

    Ok(report)
}
