//! Error types for decoding, reconciling and loading.

use std::path::PathBuf;

use crate::schema::EntityKind;

/// A CSV field that cannot be turned into its typed value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed number in column '{column}': {value:?}")]
    MalformedNumber { column: &'static str, value: String },
    #[error("missing column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("malformed timestamp in column '{column}': {value:?}")]
    MalformedTimestamp { column: &'static str, value: String },
}

/// Failure while handling one CSV record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of one file. Any of these halts the batch.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot open {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot establish checkpoint: {0}")]
    Checkpoint(#[source] rusqlite::Error),
    #[error("line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: RecordError,
    },
    #[error("commit failed: {0}")]
    Commit(#[source] rusqlite::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("cannot connect to database '{url}': {source}")]
pub struct ConnectionError {
    pub url: String,
    #[source]
    pub source: rusqlite::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("loading {file} failed: {source}")]
    File {
        kind: EntityKind,
        file: String,
        #[source]
        source: FileError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_message_includes_line() {
        let err = FileError::Record {
            line: 3,
            source: DecodeError::MalformedNumber {
                column: "dinero",
                value: "abc".to_string(),
            }
            .into(),
        };
        assert_eq!(
            err.to_string(),
            "line 3: malformed number in column 'dinero': \"abc\""
        );
    }
}
