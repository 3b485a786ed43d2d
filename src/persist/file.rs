//! Plain-text, append-only fill-up log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::{
    codec,
    config::StoreConfig,
    core::history::FillHistory,
    entry::Entry,
    types::{EntryIndex, LineNo},
};

use super::{SkipReason, SkippedLine, StoreError, StoreResult};

/// Suffix appended to archive file names.
pub const ARCHIVE_SUFFIX: &str = "-mileage.config";

/// Outcome of reading the whole log.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadReport {
    /// Decoded entries in file order.
    pub entries: Vec<Entry>,
    /// Lines that were skipped.
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    /// Number of skipped lines.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Archive file name for a clear performed at `at`.
pub fn archive_file_name(at: &NaiveDateTime) -> String {
    format!("{}{}", at.format("%Y%m%d%H%M%S%3f"), ARCHIVE_SUFFIX)
}

/// Sole owner of the log file for the session.
///
/// The handle is held from [`LogStore::open`] until the store is dropped or
/// [`LogStore::close`] is called. All access goes through `&mut self`.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    file: File,
    history: FillHistory,
    skipped: Vec<SkippedLine>,
    torn_tail: bool,
}

impl LogStore {
    /// Opens (creating if needed) the log described by `config` and loads it.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.dir).map_err(|source| StoreError::CreateDir {
            path: config.dir.clone(),
            source,
        })?;

        let path = config.log_path();
        let file = open_log(&path)?;
        let mut store = Self {
            path,
            file,
            history: FillHistory::new(),
            skipped: Vec::new(),
            torn_tail: false,
        };
        store.load_all()?;
        debug!(
            path = %store.path.display(),
            entries = store.history.len(),
            skipped = store.skipped.len(),
            "opened mileage log"
        );
        Ok(store)
    }

    /// Opens the log at an explicit file path.
    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(&StoreConfig::at(path))
    }

    /// Re-reads the file from the start, replacing the in-memory history.
    ///
    /// Lines that fail to decode or validate are skipped and recorded.
    pub fn load_all(&mut self) -> StoreResult<LoadReport> {
        let read_err = |source| StoreError::Read {
            path: self.path.clone(),
            source,
        };

        (&self.file).seek(SeekFrom::Start(0)).map_err(read_err)?;
        let mut reader = BufReader::new(&self.file);

        let mut report = LoadReport::default();
        let mut buf = Vec::new();
        let mut line_no: LineNo = 0;
        let mut torn_tail = false;

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(read_err)?;
            if n == 0 {
                break;
            }
            line_no += 1;
            torn_tail = buf.last() != Some(&b'\n');

            match decode_line(&buf) {
                Ok(Some(entry)) => report.entries.push(entry),
                Ok(None) => {}
                Err(reason) => {
                    warn!(
                        path = %self.path.display(),
                        line = line_no,
                        %reason,
                        "skipping malformed log line"
                    );
                    report.skipped.push(SkippedLine { line_no, reason });
                }
            }
        }

        self.history = FillHistory::from_entries(report.entries.iter().cloned());
        self.skipped = report.skipped.clone();
        self.torn_tail = torn_tail;
        Ok(report)
    }

    /// Validates, encodes and durably appends one entry.
    ///
    /// Nothing is written when validation fails. A failed write is truncated
    /// back to the previous length so no partial record is left behind.
    pub fn append(&mut self, entry: Entry) -> StoreResult<EntryIndex> {
        entry.validate()?;

        let mut line = String::new();
        if self.torn_tail {
            line.push('\n');
        }
        line.push_str(&codec::encode(&entry));
        line.push('\n');

        if let Err(AppendFailure {
            source,
            rolled_back,
        }) = append_or_rollback(&mut self.file, line.as_bytes())
        {
            if !rolled_back {
                warn!(path = %self.path.display(), "could not roll back partial append");
                self.torn_tail = true;
            }
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }
        self.torn_tail = false;

        let idx = self.history.push(entry);
        debug!(path = %self.path.display(), index = idx, "appended entry");
        Ok(idx)
    }

    /// Archives the log under a name derived from the current local time and
    /// starts a fresh, empty log.
    pub fn archive_and_clear(&mut self) -> StoreResult<PathBuf> {
        self.archive_and_clear_at(Local::now().naive_local())
    }

    /// Archives the log as `<yyyyMMddHHmmsszzz>-mileage.config` next to it
    /// and starts a fresh, empty log.
    ///
    /// On failure the log file and the in-memory history are unchanged.
    pub fn archive_and_clear_at(&mut self, at: NaiveDateTime) -> StoreResult<PathBuf> {
        let target = self.dir().join(archive_file_name(&at));
        if target.try_exists().unwrap_or(true) {
            warn!(archive = %target.display(), "archive target already exists");
            return Err(StoreError::ArchiveExists { path: target });
        }

        if let Err(source) = self.file.sync_all() {
            warn!(path = %self.path.display(), %source, "sync before archive failed");
        }
        if let Err(source) = fs::rename(&self.path, &target) {
            warn!(
                from = %self.path.display(),
                to = %target.display(),
                %source,
                "archive rename failed"
            );
            return Err(StoreError::Archive {
                from: self.path.clone(),
                to: target,
                source,
            });
        }

        self.file = reopen_or_restore(&self.path, &target, open_log)?;
        self.history.clear();
        self.skipped.clear();
        self.torn_tail = false;
        info!(archive = %target.display(), "archived and cleared mileage log");
        Ok(target)
    }

    /// Flushes and releases the file handle.
    pub fn close(self) -> StoreResult<()> {
        self.file.sync_all().map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the log and its archives.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// In-memory history, oldest first.
    pub fn history(&self) -> &FillHistory {
        &self.history
    }

    /// Loaded and appended entries, oldest first.
    pub fn entries(&self) -> &[Entry] {
        self.history.entries()
    }

    /// Most recently loaded or appended entry.
    pub fn last_entry(&self) -> Option<&Entry> {
        self.history.last()
    }

    /// Lines skipped by the last load.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Number of lines skipped by the last load.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Byte sink the log is appended to.
trait LogSink: Write {
    fn len(&self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

#[derive(Debug)]
struct AppendFailure {
    source: io::Error,
    /// The sink is back at its length from before the write.
    rolled_back: bool,
}

/// Writes `bytes` and syncs, or cuts the sink back to where it started.
fn append_or_rollback<S: LogSink>(sink: &mut S, bytes: &[u8]) -> Result<(), AppendFailure> {
    let start = sink.len().map_err(|source| AppendFailure {
        source,
        rolled_back: true,
    })?;

    let written = sink
        .write_all(bytes)
        .and_then(|()| sink.flush())
        .and_then(|()| sink.sync());
    let Err(source) = written else {
        return Ok(());
    };

    let rolled_back = sink
        .truncate(start)
        .and_then(|()| sink.sync())
        .is_ok();
    Err(AppendFailure {
        source,
        rolled_back,
    })
}

/// Opens a fresh log at `log`; if that fails, moves `archive` back into place.
fn reopen_or_restore(
    log: &Path,
    archive: &Path,
    open: impl FnOnce(&Path) -> StoreResult<File>,
) -> StoreResult<File> {
    open(log).inspect_err(|_| {
        if let Err(restore) = fs::rename(archive, log) {
            warn!(
                %restore,
                archive = %archive.display(),
                "could not restore log after failed clear"
            );
        }
    })
}

fn open_log(path: &Path) -> StoreResult<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn decode_line(raw: &[u8]) -> Result<Option<Entry>, SkipReason> {
    let line = std::str::from_utf8(raw).map_err(|_| SkipReason::Encoding)?;
    if line.trim().is_empty() {
        return Ok(None);
    }
    let entry = codec::decode(line)?;
    entry.validate()?;
    Ok(Some(entry))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_milli_opt(7, 15, 30, 250)
            .unwrap()
    }

    #[test]
    fn archive_name_is_sortable_timestamp() {
        assert_eq!(
            archive_file_name(&at(9)),
            "20240609071530250-mileage.config"
        );
    }

    #[test]
    fn open_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let cfg = StoreConfig::in_dir(tmp.path().join("nested").join(".mileage"));
        let store = LogStore::open(&cfg).unwrap();
        assert!(cfg.log_path().is_file());
        assert!(store.entries().is_empty());
        assert_eq!(store.skipped_count(), 0);
    }

    #[test]
    fn torn_tail_gets_its_own_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mileage.conf");
        fs::write(&path, "2024-06-01 300 40 60").unwrap();

        let mut store = LogStore::open_path(&path).unwrap();
        assert_eq!(store.entries().len(), 1);
        store
            .append(Entry::new(at(2), 250.0, 35.0, 52.0))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "2024-06-01 300 40 60\n2024-06-02-07-15-30 250 35 52\n"
        );
    }

    /// Accepts up to `limit` bytes in total, then fails every write.
    struct ShortWriter {
        data: Vec<u8>,
        limit: usize,
        truncate_fails: bool,
    }

    impl ShortWriter {
        fn new(existing: &[u8], room: usize) -> Self {
            Self {
                data: existing.to_vec(),
                limit: existing.len() + room,
                truncate_fails: false,
            }
        }
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit.saturating_sub(self.data.len());
            if room == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogSink for ShortWriter {
        fn len(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::other("read-only file system"));
            }
            self.data.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_write_is_rolled_back_before_reload() {
        let existing = b"2024-06-01 300 40 60\n";
        let line = format!("{}\n", codec::encode(&Entry::new(at(2), 250.0, 35.0, 52.0)));
        // Everything but the last cost digit and the newline reaches disk.
        let mut sink = ShortWriter::new(existing, line.len() - 2);

        let partial = &line[..line.len() - 2];
        assert_eq!(codec::decode(partial).map(|e| e.cost), Ok(5.0));

        let failure = append_or_rollback(&mut sink, line.as_bytes()).unwrap_err();
        assert!(failure.rolled_back);
        assert_eq!(sink.data, existing);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mileage.conf");
        fs::write(&path, &sink.data).unwrap();
        let store = LogStore::open_path(&path).unwrap();
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].cost, 60.0);
        assert_eq!(store.skipped_count(), 0);
    }

    #[test]
    fn failed_rollback_is_reported() {
        let mut sink = ShortWriter::new(b"", 4);
        sink.truncate_fails = true;
        let failure = append_or_rollback(&mut sink, b"2024-06-02 250 35 52\n").unwrap_err();
        assert!(!failure.rolled_back);
        assert_eq!(sink.data, b"2024");
    }

    #[test]
    fn log_file_truncates_and_keeps_appending_at_the_end() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mileage.conf");
        fs::write(&path, "2024-06-01 300 40 60\n").unwrap();

        let mut file = open_log(&path).unwrap();
        let start = file.len().unwrap();
        file.write_all(b"2024-06-02-07-15").unwrap();
        file.truncate(start).unwrap();
        append_or_rollback(&mut file, b"2024-06-03 310 41 61\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2024-06-01 300 40 60\n2024-06-03 310 41 61\n"
        );
    }

    #[test]
    fn failed_reopen_puts_the_archive_back() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("mileage.conf");
        let archive = tmp.path().join(archive_file_name(&at(3)));
        fs::write(&archive, "2024-06-01 300 40 60\n").unwrap();

        let err = reopen_or_restore(&log, &archive, |path| {
            Err(StoreError::Open {
                path: path.to_path_buf(),
                source: io::Error::other("too many open files"),
            })
        })
        .unwrap_err();

        assert!(matches!(err, StoreError::Open { .. }));
        assert!(!archive.exists());
        assert_eq!(fs::read_to_string(&log).unwrap(), "2024-06-01 300 40 60\n");
    }

    #[test]
    fn non_utf8_line_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mileage.conf");
        fs::write(&path, b"\xff\xfe garbage\n2024-06-01 300 40 60\n\n").unwrap();

        let store = LogStore::open_path(&path).unwrap();
        assert_eq!(store.entries().len(), 1);
        assert_eq!(
            store.skipped(),
            &[SkippedLine {
                line_no: 1,
                reason: SkipReason::Encoding
            }]
        );
    }
}
