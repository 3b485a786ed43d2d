//! Append-ordered fill-up history.

use serde::{Deserialize, Serialize};

use crate::{
    core::indices::VecIndex,
    entry::Entry,
    metrics::Metrics,
    types::{EntryIndex, MonthKey},
};

/// Sums over a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Number of entries summed.
    pub count: usize,
    /// Total miles.
    pub distance: f64,
    /// Total litres.
    pub volume: f64,
    /// Total cost in pounds.
    pub cost: f64,
}

impl Totals {
    fn add(&mut self, entry: &Entry) {
        self.count += 1;
        self.distance += entry.distance;
        self.volume += entry.volume;
        self.cost += entry.cost;
    }

    /// Metrics over the summed figures, if computable.
    pub fn metrics(&self) -> Option<Metrics> {
        Metrics::from_parts(self.distance, self.volume, self.cost).ok()
    }
}

/// Entries in the order they were appended to the log.
#[derive(Debug, Default)]
pub struct FillHistory {
    entries: Vec<Entry>,
    by_month: VecIndex<MonthKey>,
    totals: Totals,
}

impl FillHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History built from entries in append order.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut history = Self::new();
        for entry in entries {
            history.push(entry);
        }
        history
    }

    /// Adds an entry at the end and returns its index.
    pub fn push(&mut self, entry: Entry) -> EntryIndex {
        let idx = self.entries.len();
        self.by_month.entry(entry.month()).or_default().push(idx);
        self.totals.add(&entry);
        self.entries.push(entry);
        idx
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_month.clear();
        self.totals = Totals::default();
    }

    /// Entry at `idx`.
    pub fn get(&self, idx: EntryIndex) -> Option<&Entry> {
        self.entries.get(idx)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&Entry> {
        self.entries.iter().rev().take(n).collect()
    }

    /// Cloned variant of [`FillHistory::recent`].
    pub fn recent_cloned(&self, n: usize) -> Vec<Entry> {
        self.recent(n).into_iter().cloned().collect()
    }

    /// Most recently appended entry.
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded in the given month, oldest first.
    pub fn by_month(&self, month: MonthKey) -> Vec<&Entry> {
        self.by_month
            .get(&month)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|idx| self.entries.get(*idx))
            .collect()
    }

    /// Months that have at least one entry, ascending.
    pub fn months(&self) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = self.by_month.keys().copied().collect();
        months.sort_unstable();
        months
    }

    /// Sums over the given month.
    pub fn month_totals(&self, month: MonthKey) -> Totals {
        let mut totals = Totals::default();
        for entry in self.by_month(month) {
            totals.add(entry);
        }
        totals
    }

    /// Sums over the whole history.
    pub fn totals(&self) -> Totals {
        self.totals
    }
}
