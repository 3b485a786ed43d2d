//! Shared primitive aliases and unit constants.

use serde::{Deserialize, Serialize};

/// Position of an entry in append order, starting at 0.
pub type EntryIndex = usize;
/// 1-based line number within the log file.
pub type LineNo = usize;

/// Imperial gallons per litre.
pub const LITRES_TO_GALLONS: f64 = 0.219969157;
/// Minor currency units per major unit (pence per pound).
pub const COST_SCALE: f64 = 100.0;

/// Significant digits used when displaying economy.
pub const ECONOMY_DISPLAY_DIGITS: usize = 5;
/// Significant digits used when displaying cost per distance.
pub const COST_PER_DISTANCE_DISPLAY_DIGITS: usize = 4;

/// Calendar month key used by the per-month index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year.
    pub year: i32,
    /// Month of the year, 1 through 12.
    pub month: u32,
}

impl MonthKey {
    /// Builds a key from a year and 1-based month.
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

/// Numeric field of an entry, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Distance travelled since the previous fill-up.
    Distance,
    /// Fuel volume added.
    Volume,
    /// Amount paid.
    Cost,
}

impl Field {
    /// Lower-case field name as shown to users.
    pub fn name(self) -> &'static str {
        match self {
            Field::Distance => "distance",
            Field::Volume => "volume",
            Field::Cost => "cost",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
