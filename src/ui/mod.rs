//! Progress reporting for a load run
//!
//! The loader only talks to the `Ui` trait:
//! - `LogUi` writes through the `log` macros (console via env_logger)
//! - `SilentUi` keeps the messages in memory for tests

use log::{error, info};
use std::path::Path;

use crate::schema::EntityKind;
use crate::writer::FileReport;

/// Trait for UI implementations - allows both console and silent/test modes
pub trait Ui {
    fn file_started(&mut self, kind: EntityKind, path: &Path);
    fn file_committed(&mut self, kind: EntityKind, report: &FileReport);
    fn log(&mut self, message: impl Into<String>);
    fn error(&mut self, message: impl Into<String>);
}

/// Console UI backed by the `log` crate
#[derive(Default)]
pub struct LogUi;

impl LogUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for LogUi {
    fn file_started(&mut self, kind: EntityKind, path: &Path) {
        info!(">>> Loading {} from {}", kind.file_name(), path.display());
    }

    fn file_committed(&mut self, kind: EntityKind, report: &FileReport) {
        info!("{} loaded and committed ({})", kind.file_name(), report);
    }

    fn log(&mut self, message: impl Into<String>) {
        info!("{}", message.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        error!("{}", message.into());
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi {
    pub messages: Vec<String>,
}

impl SilentUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl Ui for SilentUi {
    fn file_started(&mut self, kind: EntityKind, _path: &Path) {
        self.messages.push(format!("started {}", kind.file_name()));
    }

    fn file_committed(&mut self, kind: EntityKind, report: &FileReport) {
        self.messages
            .push(format!("committed {} ({})", kind.file_name(), report));
    }

    fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}
