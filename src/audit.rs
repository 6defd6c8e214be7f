//! Append-only error and duplicate logs.
//!
//! One line per event, stamped with local time as `dd-MM-yyyy HH:mm:ss`.
//! A failed write is reported on the console and otherwise ignored.

use chrono::{Local, NaiveDateTime};
use log::error;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const STAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

#[derive(Debug, Clone)]
pub struct AuditLog {
    errors_path: PathBuf,
    duplicates_path: PathBuf,
}

impl AuditLog {
    pub fn new(errors_path: impl Into<PathBuf>, duplicates_path: impl Into<PathBuf>) -> Self {
        Self {
            errors_path: errors_path.into(),
            duplicates_path: duplicates_path.into(),
        }
    }

    pub fn errors_path(&self) -> &Path {
        &self.errors_path
    }

    pub fn duplicates_path(&self) -> &Path {
        &self.duplicates_path
    }

    /// `[stamp] ERROR: Fichero: <file> | Error: <message>`
    pub fn file_error(&self, file: &str, message: &str) {
        let line = format_line(
            Local::now().naive_local(),
            "ERROR",
            &format!("Fichero: {} | Error: {}", file, message),
        );
        if let Err(e) = append_line(&self.errors_path, &line) {
            error!(
                "Could not write to error log {}: {}",
                self.errors_path.display(),
                e
            );
        }
    }

    /// `[stamp] DUPLICADO: <description>`
    pub fn duplicate(&self, description: &str) {
        let line = format_line(Local::now().naive_local(), "DUPLICADO", description);
        if let Err(e) = append_line(&self.duplicates_path, &line) {
            error!(
                "Could not write to duplicate log {}: {}",
                self.duplicates_path.display(),
                e
            );
        }
    }
}

fn format_line(at: NaiveDateTime, tag: &str, message: &str) -> String {
    format!("[{}] {}: {}", at.format(STAMP_FORMAT), tag, message)
}

fn append_line(path: &Path, line: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}
