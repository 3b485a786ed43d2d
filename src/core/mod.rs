//! In-memory fill-up history and index helpers.

/// Ordered in-memory history with month index and totals.
pub mod history;
/// Helper index aliases.
pub mod indices;
