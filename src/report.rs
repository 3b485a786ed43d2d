//! Display-ready view of the log for list presentations.

use serde::{Deserialize, Serialize};

use crate::{
    core::history::{FillHistory, Totals},
    entry::Entry,
    metrics::{Metrics, unavailable_label},
    types::EntryIndex,
};

/// One row of the list, with metrics when they can be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    /// Position in append order.
    pub index: EntryIndex,
    /// The stored record.
    pub entry: Entry,
    /// `None` when the entry cannot yield finite metrics.
    pub metrics: Option<Metrics>,
    /// Summary line as shown to users.
    pub label: String,
}

impl EntryView {
    /// Builds the view for `entry` at `index`.
    pub fn new(index: EntryIndex, entry: &Entry) -> Self {
        let metrics = Metrics::compute(entry).ok();
        let label = match &metrics {
            Some(m) => m.label(entry.date()),
            None => unavailable_label(entry.date()),
        };
        Self {
            index,
            entry: entry.clone(),
            metrics,
            label,
        }
    }
}

/// Everything a list view needs in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Rows, newest first.
    pub entries: Vec<EntryView>,
    /// Malformed lines skipped when the log was loaded.
    pub skipped: usize,
    /// Sums over every row.
    pub totals: Totals,
    /// Metrics over the sums, when computable.
    pub overall: Option<Metrics>,
}

impl Report {
    /// Builds a report over `history`.
    pub fn build(history: &FillHistory, skipped: usize) -> Self {
        let entries = history
            .entries()
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, entry)| EntryView::new(idx, entry))
            .collect();
        let totals = history.totals();
        Self {
            entries,
            skipped,
            totals,
            overall: totals.metrics(),
        }
    }

    /// Summary lines, newest first.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|row| row.label.as_str()).collect()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
