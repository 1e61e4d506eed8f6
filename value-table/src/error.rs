use std::path::PathBuf;

use engine::PositionKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValueTableError {
    #[error("position table {path:?} is not writable")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("position table {path:?} is not readable")]
    NotReadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
    #[error("position key {key:?} cannot be stored: {reason}")]
    InvalidKey {
        key: PositionKey,
        reason: &'static str,
    },
    #[error("position {key} is missing from the table during {operation}")]
    InvariantViolation {
        key: PositionKey,
        operation: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ValueTableError>;
