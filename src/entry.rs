//! Fill-up record, raw draft input, and validation.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Field, MonthKey};

/// Why an entry was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Distance must be greater than zero.
    #[error("distance must be greater than zero, got {0}")]
    NonPositiveDistance(f64),
    /// Volume must be greater than zero.
    #[error("volume must be greater than zero, got {0}")]
    NonPositiveVolume(f64),
    /// Cost must not be negative.
    #[error("cost must not be negative, got {0}")]
    NegativeCost(f64),
    /// A field held infinity or NaN.
    #[error("{field} must be a finite number")]
    NonFinite {
        /// Offending field.
        field: Field,
    },
    /// User-entered text was not a number.
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber {
        /// Offending field.
        field: Field,
        /// Text as entered.
        value: String,
    },
}

/// One fill-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// When the fill-up was recorded. Only the date is significant.
    pub recorded_at: NaiveDateTime,
    /// Miles driven since the previous fill-up.
    pub distance: f64,
    /// Litres added.
    pub volume: f64,
    /// Amount paid, in pounds.
    pub cost: f64,
}

impl Entry {
    /// Builds an entry without validating it.
    pub fn new(recorded_at: NaiveDateTime, distance: f64, volume: f64, cost: f64) -> Self {
        Self {
            recorded_at,
            distance,
            volume,
            cost,
        }
    }

    /// Builds a validated entry.
    pub fn try_new(
        recorded_at: NaiveDateTime,
        distance: f64,
        volume: f64,
        cost: f64,
    ) -> Result<Self, ValidationError> {
        let entry = Self::new(recorded_at, distance, volume, cost);
        entry.validate()?;
        Ok(entry)
    }

    /// Calendar date of the fill-up.
    pub fn date(&self) -> NaiveDate {
        self.recorded_at.date()
    }

    /// Month bucket of the fill-up.
    pub fn month(&self) -> MonthKey {
        use chrono::Datelike;
        let date = self.date();
        MonthKey::new(date.year(), date.month())
    }

    /// Checks the invariants every stored entry must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            (Field::Distance, self.distance),
            (Field::Volume, self.volume),
            (Field::Cost, self.cost),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
        }
        if self.distance <= 0.0 {
            return Err(ValidationError::NonPositiveDistance(self.distance));
        }
        if self.volume <= 0.0 {
            return Err(ValidationError::NonPositiveVolume(self.volume));
        }
        if self.cost < 0.0 {
            return Err(ValidationError::NegativeCost(self.cost));
        }
        Ok(())
    }

    /// Returns true when [`Entry::validate`] succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Raw field text as collected by a form, before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryDraft {
    /// Fill-up time; `None` means now.
    pub recorded_at: Option<NaiveDateTime>,
    /// Distance as typed.
    pub distance: String,
    /// Volume as typed.
    pub volume: String,
    /// Cost as typed.
    pub cost: String,
}

impl EntryDraft {
    /// Draft dated now.
    pub fn new(
        distance: impl Into<String>,
        volume: impl Into<String>,
        cost: impl Into<String>,
    ) -> Self {
        Self {
            recorded_at: None,
            distance: distance.into(),
            volume: volume.into(),
            cost: cost.into(),
        }
    }

    /// Overrides the fill-up time.
    pub fn at(mut self, recorded_at: NaiveDateTime) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// Parses and validates the draft into an [`Entry`].
    pub fn parse(&self) -> Result<Entry, ValidationError> {
        let recorded_at = self
            .recorded_at
            .unwrap_or_else(|| Local::now().naive_local());
        Entry::try_new(
            recorded_at,
            parse_field(Field::Distance, &self.distance)?,
            parse_field(Field::Volume, &self.volume)?,
            parse_field(Field::Cost, &self.cost)?,
        )
    }
}

fn parse_field(field: Field, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn rejects_zero_distance_and_volume() {
        let when = at(2024, 3, 1);
        assert_eq!(
            Entry::try_new(when, 0.0, 40.0, 60.0),
            Err(ValidationError::NonPositiveDistance(0.0))
        );
        assert_eq!(
            Entry::try_new(when, 300.0, -1.0, 60.0),
            Err(ValidationError::NonPositiveVolume(-1.0))
        );
        assert_eq!(
            Entry::try_new(when, 300.0, 40.0, -0.5),
            Err(ValidationError::NegativeCost(-0.5))
        );
        assert!(Entry::try_new(when, 300.0, 40.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_non_finite_fields() {
        let err = Entry::try_new(at(2024, 3, 1), f64::NAN, 40.0, 60.0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonFinite {
                field: Field::Distance
            }
        );
    }

    #[test]
    fn draft_names_the_bad_field() {
        let draft = EntryDraft::new("300", "forty", "60").at(at(2024, 3, 1));
        let err = draft.parse().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidNumber {
                field: Field::Volume,
                value: "forty".to_string()
            }
        );
        assert_eq!(err.to_string(), "volume is not a number: \"forty\"");
    }

    #[test]
    fn draft_trims_and_keeps_date() {
        let when = at(2023, 12, 31);
        let entry = EntryDraft::new(" 312.5 ", "41.2", "61")
            .at(when)
            .parse()
            .unwrap();
        assert_eq!(entry.recorded_at, when);
        assert_eq!(entry.distance, 312.5);
        assert_eq!(entry.month(), MonthKey::new(2023, 12));
    }
}
