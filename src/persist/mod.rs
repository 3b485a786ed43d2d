pub mod file;

use std::path::PathBuf;

use thiserror::Error;

use crate::{codec::DecodeError, entry::ValidationError, types::LineNo};

/// Failures raised by [`file::LogStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The log directory could not be created.
    #[error("cannot create log directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The log file could not be opened or created.
    #[error("cannot open log file {path}: {source}")]
    Open {
        /// Log path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Reading the log failed part way.
    #[error("cannot read log file {path}: {source}")]
    Read {
        /// Log path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Appending to the log failed.
    #[error("cannot write log file {path}: {source}")]
    Write {
        /// Log path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The entry was rejected before anything was written.
    #[error("invalid entry: {0}")]
    Validation(#[from] ValidationError),
    /// An archive with the chosen name already exists.
    #[error("archive {path} already exists")]
    ArchiveExists {
        /// Archive path.
        path: PathBuf,
    },
    /// Renaming the log to its archive name failed.
    #[error("cannot archive {from} to {to}: {source}")]
    Archive {
        /// Log path.
        from: PathBuf,
        /// Archive path.
        to: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Why a log line was skipped during load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    /// The line was not valid UTF-8.
    #[error("not valid UTF-8")]
    Encoding,
    /// The line did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The line decoded to an entry that breaks an invariant.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A skipped log line.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_no: LineNo,
    /// Why it was skipped.
    pub reason: SkipReason,
}
