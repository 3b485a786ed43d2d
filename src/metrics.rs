//! Derived fuel economy and cost figures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entry::Entry,
    types::{
        COST_PER_DISTANCE_DISPLAY_DIGITS, COST_SCALE, ECONOMY_DISPLAY_DIGITS, LITRES_TO_GALLONS,
    },
};

/// Returned when an entry cannot yield finite metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// Distance or volume is zero, negative, or not finite.
    #[error("metrics unavailable")]
    Unavailable,
}

/// Figures derived from one entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Miles per imperial gallon.
    pub economy: f64,
    /// Pence per mile.
    pub cost_per_distance: f64,
}

impl Metrics {
    /// Computes metrics for `entry`.
    pub fn compute(entry: &Entry) -> Result<Self, MetricsError> {
        Self::from_parts(entry.distance, entry.volume, entry.cost)
    }

    /// Computes metrics from raw figures.
    pub fn from_parts(distance: f64, volume: f64, cost: f64) -> Result<Self, MetricsError> {
        if !(distance.is_finite() && distance > 0.0 && volume.is_finite() && volume > 0.0) {
            return Err(MetricsError::Unavailable);
        }

        let economy = distance / (LITRES_TO_GALLONS * volume);
        let cost_per_distance = cost * COST_SCALE / distance;
        if !(economy.is_finite() && cost_per_distance.is_finite()) {
            return Err(MetricsError::Unavailable);
        }

        Ok(Self {
            economy,
            cost_per_distance,
        })
    }

    /// Economy as displayed.
    pub fn economy_text(&self) -> String {
        format_significant(self.economy, ECONOMY_DISPLAY_DIGITS)
    }

    /// Cost per distance as displayed.
    pub fn cost_per_distance_text(&self) -> String {
        format_significant(self.cost_per_distance, COST_PER_DISTANCE_DISPLAY_DIGITS)
    }

    /// One-line summary, e.g. `2011-05-01: 34.096 mpg  20 pence per mile`.
    pub fn label(&self, date: NaiveDate) -> String {
        format!(
            "{}: {} mpg  {} pence per mile",
            date.format("%Y-%m-%d"),
            self.economy_text(),
            self.cost_per_distance_text()
        )
    }
}

/// Label for an entry whose metrics cannot be computed.
pub fn unavailable_label(date: NaiveDate) -> String {
    format!("{}: {}", date.format("%Y-%m-%d"), MetricsError::Unavailable)
}

/// Formats `value` with `digits` significant digits the way `%g` does:
/// fixed notation for moderate exponents, scientific otherwise, trailing
/// zeros removed.
pub fn format_significant(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
