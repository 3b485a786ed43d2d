use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use crate::{
    entry::{Entry, EntryDraft},
    persist::{
        StoreError,
        file::{LoadReport, LogStore},
    },
    report::Report,
    types::EntryIndex,
};

use super::events::LogEvent;

/// Failures surfaced through [`MileageLogHandle`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The runtime task is gone.
    #[error("mileage log runtime has shut down")]
    ChannelClosed,
}

/// Channel sizing for [`spawn_mileage_log`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Commands that may queue before senders wait.
    pub command_queue: usize,
    /// Events retained for slow subscribers.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue: 64,
            event_capacity: 256,
        }
    }
}

/// Cloneable handle to a [`LogStore`] owned by a runtime task.
///
/// Commands are processed one at a time in the order received.
#[derive(Clone)]
pub struct MileageLogHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<LogEvent>,
}

enum Command {
    Append {
        entry: Entry,
        resp: oneshot::Sender<Result<EntryIndex, RuntimeError>>,
    },
    AppendDraft {
        draft: EntryDraft,
        resp: oneshot::Sender<Result<EntryIndex, RuntimeError>>,
    },
    Entries {
        resp: oneshot::Sender<Vec<Entry>>,
    },
    Recent {
        n: usize,
        resp: oneshot::Sender<Vec<Entry>>,
    },
    Report {
        resp: oneshot::Sender<Report>,
    },
    Reload {
        resp: oneshot::Sender<Result<LoadReport, RuntimeError>>,
    },
    ArchiveAndClear {
        resp: oneshot::Sender<Result<PathBuf, RuntimeError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

/// Moves `store` into a task and returns a handle to it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_mileage_log(store: LogStore, config: RuntimeConfig) -> MileageLogHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue.max(1));
    let (events_tx, _) = broadcast::channel::<LogEvent>(config.event_capacity.max(1));

    let events_tx_loop = events_tx.clone();
    tokio::spawn(async move {
        let mut store = Some(store);
        while let Some(cmd) = cmd_rx.recv().await {
            let Some(active) = store.as_mut() else {
                break;
            };
            if let Some(resp) = handle_command(cmd, active, &events_tx_loop) {
                let closed = store.take().map(LogStore::close);
                let out = match closed {
                    Some(Err(err)) => Err(RuntimeError::from(err)),
                    _ => Ok(()),
                };
                let _ = resp.send(out);
                break;
            }
        }
        debug!("mileage log runtime stopped");
    });

    MileageLogHandle { cmd_tx, events_tx }
}

impl MileageLogHandle {
    /// Subscribes to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events_tx.subscribe()
    }

    /// Appends a validated entry.
    pub async fn append(&self, entry: Entry) -> Result<EntryIndex, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Append { entry, resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Parses raw form input and appends it.
    pub async fn append_draft(&self, draft: EntryDraft) -> Result<EntryIndex, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::AppendDraft { draft, resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// All entries, oldest first.
    pub async fn entries(&self) -> Result<Vec<Entry>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Entries { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Up to `n` entries, newest first.
    pub async fn recent(&self, n: usize) -> Result<Vec<Entry>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Recent { n, resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Display report over the current history.
    pub async fn report(&self) -> Result<Report, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Report { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Re-reads the log from disk.
    pub async fn reload(&self) -> Result<LoadReport, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Reload { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Archives the log and starts a fresh one. Callers confirm first.
    pub async fn archive_and_clear(&self) -> Result<PathBuf, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::ArchiveAndClear { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Closes the store and stops the task.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    async fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}

/// Runs one command. Returns the responder when the command is a shutdown.
fn handle_command(
    cmd: Command,
    store: &mut LogStore,
    events_tx: &broadcast::Sender<LogEvent>,
) -> Option<oneshot::Sender<Result<(), RuntimeError>>> {
    match cmd {
        Command::Append { entry, resp } => {
            let res = append(store, events_tx, entry);
            let _ = resp.send(res);
        }
        Command::AppendDraft { draft, resp } => {
            let res = draft
                .parse()
                .map_err(|err| RuntimeError::Store(err.into()))
                .and_then(|entry| append(store, events_tx, entry));
            let _ = resp.send(res);
        }
        Command::Entries { resp } => {
            let _ = resp.send(store.entries().to_vec());
        }
        Command::Recent { n, resp } => {
            let _ = resp.send(store.history().recent_cloned(n));
        }
        Command::Report { resp } => {
            let _ = resp.send(Report::build(store.history(), store.skipped_count()));
        }
        Command::Reload { resp } => {
            let res = store.load_all().map_err(RuntimeError::from);
            if let Ok(report) = &res {
                let _ = events_tx.send(LogEvent::Reloaded {
                    entries: report.entries.len(),
                    skipped: report.skipped_count(),
                });
            }
            let _ = resp.send(res);
        }
        Command::ArchiveAndClear { resp } => {
            let res = store.archive_and_clear().map_err(RuntimeError::from);
            if let Ok(archive) = &res {
                let _ = events_tx.send(LogEvent::Cleared {
                    archive: archive.clone(),
                });
            }
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => return Some(resp),
    }
    None
}

fn append(
    store: &mut LogStore,
    events_tx: &broadcast::Sender<LogEvent>,
    entry: Entry,
) -> Result<EntryIndex, RuntimeError> {
    let index = store.append(entry)?;
    let _ = events_tx.send(LogEvent::Appended { index });
    Ok(index)
}
