//! The `ObservationSource` trait: row lookups against a primitive series'
//! backing table.
//!
//! Implemented by storage backends (e.g. `strand-store-sqlite`) over a live
//! connection. Evaluation is synchronous; a source is borrowed for the
//! duration of one call.

use chrono::NaiveDate;

use crate::config::SeriesConfig;

/// The row-level lookups a primitive series needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
  /// The earliest row by date whose value is nonzero; among rows sharing
  /// that date, the latest created.
  BaseValue,
  /// The most recent row by date; among rows sharing it, the latest created.
  Latest,
  /// The row on exactly this date; the latest created if several.
  Exact(NaiveDate),
  /// The most recent row dated on or before this date; the latest created
  /// if several share it.
  OnOrBefore(NaiveDate),
  /// Every row in `[from, to]`, duplicates included.
  Range { from: NaiveDate, to: NaiveDate },
}

/// A stored row, with the creation-order key used to break same-date ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedObservation {
  pub date:       NaiveDate,
  pub value:      i64,
  pub created_at: String,
}

pub trait ObservationSource {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `lookup` against the table described by `config`.
  ///
  /// Every lookup except [`Lookup::Range`] returns at most one row.
  fn fetch(
    &self,
    config: &SeriesConfig,
    lookup: Lookup,
  ) -> Result<Vec<RecordedObservation>, Self::Error>;
}
