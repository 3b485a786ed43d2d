//! Single-line text encoding of [`Entry`] records.
//!
//! A line is `<date> <distance> <volume> <cost>`. The date token has changed
//! shape over time, so decoding walks [`DATE_FORMATS`] newest first and
//! keeps the first format that parses.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::{entry::Entry, types::Field};

/// Separator written between fields.
pub const FIELD_SEPARATOR: char = ' ';
/// Number of whitespace-separated tokens in a line.
pub const FIELD_COUNT: usize = 4;

/// Granularity of a date format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateResolution {
    /// Carries a time of day.
    DateTime,
    /// Carries only a calendar date; decodes to midnight.
    Date,
}

/// One accepted shape of the date token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    /// Human-readable layout.
    pub name: &'static str,
    /// chrono format string.
    pub pattern: &'static str,
    /// Whether the token includes a time of day.
    pub resolution: DateResolution,
}

impl DateFormat {
    /// Parses `token` with this format.
    pub fn parse(&self, token: &str) -> Option<NaiveDateTime> {
        match self.resolution {
            DateResolution::DateTime => NaiveDateTime::parse_from_str(token, self.pattern).ok(),
            DateResolution::Date => NaiveDate::parse_from_str(token, self.pattern)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN)),
        }
    }

    /// Renders `at` with this format.
    pub fn format(&self, at: &NaiveDateTime) -> String {
        at.format(self.pattern).to_string()
    }
}

/// Accepted date formats, newest first. New formats go at the front; old
/// ones are never removed.
pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat {
        name: "yyyy-MM-dd-HH-mm-ss",
        pattern: "%Y-%m-%d-%H-%M-%S",
        resolution: DateResolution::DateTime,
    },
    DateFormat {
        name: "yyyy-MM-dd",
        pattern: "%Y-%m-%d",
        resolution: DateResolution::Date,
    },
];

/// Format used for every newly written line.
pub fn canonical_format() -> &'static DateFormat {
    &DATE_FORMATS[0]
}

/// Why a line could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The line did not split into exactly four tokens.
    #[error("expected 4 fields, found {found}")]
    FieldCount {
        /// Tokens present.
        found: usize,
    },
    /// No known date format matched.
    #[error("unrecognised date {token:?}")]
    Date {
        /// Date token as read.
        token: String,
    },
    /// A numeric token did not parse.
    #[error("{field} is not a number: {token:?}")]
    Number {
        /// Offending field.
        field: Field,
        /// Token as read.
        token: String,
    },
    /// A numeric token parsed to infinity or NaN.
    #[error("{field} is not finite: {token:?}")]
    NonFinite {
        /// Offending field.
        field: Field,
        /// Token as read.
        token: String,
    },
}

/// Encodes `entry` as one line, without the terminator.
pub fn encode(entry: &Entry) -> String {
    format!(
        "{date}{sep}{distance}{sep}{volume}{sep}{cost}",
        date = canonical_format().format(&entry.recorded_at),
        distance = entry.distance,
        volume = entry.volume,
        cost = entry.cost,
        sep = FIELD_SEPARATOR,
    )
}

/// Decodes one line. Positivity is not checked here; see [`Entry::validate`].
pub fn decode(line: &str) -> Result<Entry, DecodeError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let &[date, distance, volume, cost] = tokens.as_slice() else {
        return Err(DecodeError::FieldCount {
            found: tokens.len(),
        });
    };

    let (recorded_at, _) = decode_date(date).ok_or_else(|| DecodeError::Date {
        token: date.to_string(),
    })?;

    Ok(Entry::new(
        recorded_at,
        decode_number(Field::Distance, distance)?,
        decode_number(Field::Volume, volume)?,
        decode_number(Field::Cost, cost)?,
    ))
}

/// Parses a date token, returning the value and the format that matched.
pub fn decode_date(token: &str) -> Option<(NaiveDateTime, &'static DateFormat)> {
    DATE_FORMATS
        .iter()
        .find_map(|format| format.parse(token).map(|at| (at, format)))
}

fn decode_number(field: Field, token: &str) -> Result<f64, DecodeError> {
    let value: f64 = token.parse().map_err(|_| DecodeError::Number {
        field,
        token: token.to_string(),
    })?;
    if !value.is_finite() {
        return Err(DecodeError::NonFinite {
            field,
            token: token.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn encodes_canonical_line() {
        let entry = Entry::new(at(2011, 5, 1, 17, 4, 9), 300.0, 40.25, 60.125);
        assert_eq!(encode(&entry), "2011-05-01-17-04-09 300 40.25 60.125");
    }

    #[test]
    fn decodes_both_generations() {
        let fine = decode("2011-05-01-17-04-09 300 40.25 60.125").unwrap();
        assert_eq!(fine.recorded_at, at(2011, 5, 1, 17, 4, 9));

        let coarse = decode("2011-05-01 300 40.25 60.125").unwrap();
        assert_eq!(coarse.recorded_at, at(2011, 5, 1, 0, 0, 0));
        assert_eq!(coarse.volume, 40.25);
    }

    #[test]
    fn newest_format_wins() {
        let (_, format) = decode_date("2020-02-29-23-59-59").unwrap();
        assert_eq!(format, &DATE_FORMATS[0]);
        let (_, format) = decode_date("2020-02-29").unwrap();
        assert_eq!(format.resolution, DateResolution::Date);
    }

    #[test]
    fn reports_each_failure_kind() {
        assert_eq!(
            decode("2011-05-01 300 40"),
            Err(DecodeError::FieldCount { found: 3 })
        );
        assert_eq!(
            decode("01/05/2011 300 40 60"),
            Err(DecodeError::Date {
                token: "01/05/2011".to_string()
            })
        );
        assert_eq!(
            decode("2011-05-01 3OO 40 60"),
            Err(DecodeError::Number {
                field: Field::Distance,
                token: "3OO".to_string()
            })
        );
        assert_eq!(
            decode("2011-05-01 300 inf 60"),
            Err(DecodeError::NonFinite {
                field: Field::Volume,
                token: "inf".to_string()
            })
        );
    }

    #[test]
    fn old_display_lines_are_malformed() {
        let err = decode("2011-05-01: 34.095 mpg  20 pence per mile").unwrap_err();
        assert_eq!(err, DecodeError::FieldCount { found: 7 });
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let entry = decode("  2011-05-01\t300 40 60\r").unwrap();
        assert_eq!(entry.cost, 60.0);
    }
}
