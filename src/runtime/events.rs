//! Runtime event stream payloads.

use std::path::PathBuf;

use crate::types::EntryIndex;

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// An entry was durably appended.
    Appended {
        /// Position of the new entry in append order.
        index: EntryIndex,
    },
    /// The log was re-read from disk.
    Reloaded {
        /// Entries loaded.
        entries: usize,
        /// Malformed lines skipped.
        skipped: usize,
    },
    /// The log was archived and a fresh one started.
    Cleared {
        /// Path of the archive file.
        archive: PathBuf,
    },
}
