//! Error types for `strand-core`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{config::ColumnType, series::SeriesId};

#[derive(Debug, Error)]
pub enum Error {
  // ── Request validation ──────────────────────────────────────────────────
  #[error("expected {expected} for {argument}, got {got}")]
  InvalidArgumentType {
    argument: &'static str,
    expected: &'static str,
    got:      &'static str,
  },

  #[error("expected {expected} arguments, got {got}")]
  InvalidArgumentArity { expected: usize, got: usize },

  #[error("unknown method: {0}")]
  UnknownMethod(String),

  #[error("invalid date: {0:?}")]
  InvalidDateFormat(String),

  #[error("date_to {to} is before date {from}")]
  DateRangeInverted { from: NaiveDate, to: NaiveDate },

  // ── Evaluation ──────────────────────────────────────────────────────────
  #[error("no data found")]
  NoDataFound,

  #[error("expected a single {what}, got {got} rows")]
  ExpectedExactlyOne { what: &'static str, got: usize },

  #[error("denominator cannot be zero")]
  DivisionByZero,

  #[error("result does not fit in a 64-bit integer")]
  Overflow,

  #[error("different number of results from constituents")]
  InconsistentSeriesLength,

  #[error("unknown series: {0}")]
  UnknownSeries(SeriesId),

  #[error("composition cycle through series {0}")]
  CyclicComposition(SeriesId),

  /// A failure inside a constituent of a composition, tagged with the
  /// constituent that produced it.
  #[error("constituent {id}: {source}")]
  Constituent {
    id:     SeriesId,
    #[source]
    source: Box<Error>,
  },

  // ── Registration ────────────────────────────────────────────────────────
  /// The `_weight` entry for this stream is absent or not an integer.
  #[error("missing weight for stream {0}")]
  MissingWeight(String),

  #[error("composition has no constituents")]
  NoConstituents,

  #[error("constituent {0} is listed more than once")]
  DuplicateConstituent(SeriesId),

  #[error("missing table config")]
  MissingTable,

  #[error("table {0} not found")]
  TableNotFound(String),

  #[error("{role} column {column} not found")]
  ColumnNotFound { role: &'static str, column: String },

  #[error("{role} column {column} must be of type {expected}, found {found}")]
  ColumnTypeMismatch {
    role:     &'static str,
    column:   String,
    expected: ColumnType,
    found:    ColumnType,
  },

  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("series {0} already exists")]
  SeriesExists(SeriesId),

  #[error("series {0} is not a primitive series")]
  NotPrimitive(SeriesId),

  // ── Pass-through ────────────────────────────────────────────────────────
  #[error("backing store error: {0}")]
  BackingStore(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The discriminant of an [`Error`], with constituent wrapping removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  InvalidArgumentType,
  InvalidArgumentArity,
  UnknownMethod,
  InvalidDateFormat,
  DateRangeInverted,
  NoDataFound,
  ExpectedExactlyOne,
  DivisionByZero,
  Overflow,
  InconsistentSeriesLength,
  UnknownSeries,
  CyclicComposition,
  MissingWeight,
  NoConstituents,
  DuplicateConstituent,
  MissingTable,
  TableNotFound,
  ColumnNotFound,
  ColumnTypeMismatch,
  InvalidIdentifier,
  SeriesExists,
  NotPrimitive,
  BackingStore,
}

impl Error {
  /// Wrap a backend error.
  pub fn backing_store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::BackingStore(Box::new(err))
  }

  /// Tag this error as coming from constituent `id`.
  pub fn in_constituent(self, id: &SeriesId) -> Self {
    Self::Constituent { id: id.clone(), source: Box::new(self) }
  }

  /// The kind of the innermost error; constituent wrapping is transparent.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Constituent { source, .. } => source.kind(),
      Self::InvalidArgumentType { .. } => ErrorKind::InvalidArgumentType,
      Self::InvalidArgumentArity { .. } => ErrorKind::InvalidArgumentArity,
      Self::UnknownMethod(_) => ErrorKind::UnknownMethod,
      Self::InvalidDateFormat(_) => ErrorKind::InvalidDateFormat,
      Self::DateRangeInverted { .. } => ErrorKind::DateRangeInverted,
      Self::NoDataFound => ErrorKind::NoDataFound,
      Self::ExpectedExactlyOne { .. } => ErrorKind::ExpectedExactlyOne,
      Self::DivisionByZero => ErrorKind::DivisionByZero,
      Self::Overflow => ErrorKind::Overflow,
      Self::InconsistentSeriesLength => ErrorKind::InconsistentSeriesLength,
      Self::UnknownSeries(_) => ErrorKind::UnknownSeries,
      Self::CyclicComposition(_) => ErrorKind::CyclicComposition,
      Self::MissingWeight(_) => ErrorKind::MissingWeight,
      Self::NoConstituents => ErrorKind::NoConstituents,
      Self::DuplicateConstituent(_) => ErrorKind::DuplicateConstituent,
      Self::MissingTable => ErrorKind::MissingTable,
      Self::TableNotFound(_) => ErrorKind::TableNotFound,
      Self::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
      Self::ColumnTypeMismatch { .. } => ErrorKind::ColumnTypeMismatch,
      Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
      Self::SeriesExists(_) => ErrorKind::SeriesExists,
      Self::NotPrimitive(_) => ErrorKind::NotPrimitive,
      Self::BackingStore(_) => ErrorKind::BackingStore,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
