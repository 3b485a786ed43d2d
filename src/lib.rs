//! Append-only fuel fill-up log with a plain-text line codec.
//!
//! # Examples
//!
//! Encoding and decoding a line with [`codec`]:
//! ```
//! use chrono::NaiveDate;
//! use mileage::{codec, entry::Entry, metrics::Metrics};
//!
//! let at = NaiveDate::from_ymd_opt(2011, 5, 1)
//!     .unwrap()
//!     .and_hms_opt(17, 4, 9)
//!     .unwrap();
//! let entry = Entry::try_new(at, 300.0, 40.0, 60.0).expect("valid entry");
//! let line = codec::encode(&entry);
//! assert_eq!(line, "2011-05-01-17-04-09 300 40 60");
//!
//! let legacy = codec::decode("2011-05-01 300 40 60").expect("date-only line");
//! assert_eq!(legacy.date(), entry.date());
//!
//! let metrics = Metrics::compute(&entry).expect("metrics");
//! assert_eq!(metrics.label(entry.date()), "2011-05-01: 34.096 mpg  20 pence per mile");
//! ```
//!
//! Using the on-disk store:
//! ```no_run
//! use mileage::{config::StoreConfig, entry::EntryDraft, persist::file::LogStore};
//!
//! let mut store = LogStore::open(&StoreConfig::from_env()).expect("open log");
//! store
//!     .append(EntryDraft::new("300", "40", "60").parse().expect("valid draft"))
//!     .expect("append");
//! for entry in store.history().recent(10) {
//!     println!("{entry:?}");
//! }
//! let archive = store.archive_and_clear().expect("archive");
//! println!("old log kept at {}", archive.display());
//! ```
#![deny(missing_docs)]

/// Line codec and the ordered date-format list.
pub mod codec;
/// Log location settings.
pub mod config;
/// In-memory history and index helpers.
pub mod core;
/// Fill-up record and draft input.
pub mod entry;
/// Derived economy and cost metrics.
pub mod metrics;
/// On-disk log store and its errors.
pub mod persist;
/// Display report for list presentations.
pub mod report;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared aliases and unit constants.
pub mod types;
