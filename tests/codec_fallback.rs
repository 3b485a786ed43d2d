use chrono::{Datelike, NaiveDate, Timelike};

use mileage::{
    codec::{self, DATE_FORMATS, DateResolution, DecodeError},
    entry::Entry,
    metrics::{Metrics, MetricsError},
};

#[test]
fn formats_are_listed_newest_first() {
    assert_eq!(DATE_FORMATS[0].name, "yyyy-MM-dd-HH-mm-ss");
    assert_eq!(DATE_FORMATS[0].resolution, DateResolution::DateTime);
    assert_eq!(DATE_FORMATS.last().map(|f| f.name), Some("yyyy-MM-dd"));
    assert_eq!(codec::canonical_format(), &DATE_FORMATS[0]);
}

#[test]
fn coarse_lines_load_even_though_encode_is_fine_grained() {
    let at = NaiveDate::from_ymd_opt(2012, 8, 14)
        .unwrap()
        .and_hms_opt(6, 45, 0)
        .unwrap();
    let written = codec::encode(&Entry::new(at, 320.0, 44.1, 63.5));
    assert!(written.starts_with("2012-08-14-06-45-00 "));

    let legacy = codec::decode("2012-08-14 320 44.1 63.5").expect("legacy line");
    assert_eq!(legacy.date(), at.date());
    assert_eq!(legacy.recorded_at.hour(), 0);
    assert_eq!(legacy.date().year(), 2012);
}

#[test]
fn unknown_date_formats_fail() {
    for line in [
        "14/08/2012 320 44.1 63.5",
        "2012-08-14T06:45:00 320 44.1 63.5",
        "2012-13-01 320 44.1 63.5",
    ] {
        assert!(
            matches!(codec::decode(line), Err(DecodeError::Date { .. })),
            "{line} should fail on its date"
        );
    }
}

#[test]
fn corrupted_zero_volume_never_yields_infinite_metrics() {
    let entry = codec::decode("2012-08-14 320 0 63.5").expect("decodes");
    assert!(!entry.is_valid());
    assert_eq!(Metrics::compute(&entry), Err(MetricsError::Unavailable));
}

#[test]
fn reference_metrics() {
    let entry = codec::decode("2012-08-14 300 40 60").expect("decodes");
    let m = Metrics::compute(&entry).expect("metrics");
    assert_eq!(m.economy_text(), "34.096");
    assert_eq!(m.cost_per_distance, 20.0);
}
