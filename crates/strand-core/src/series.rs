//! Observations and series identity.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Observation ─────────────────────────────────────────────────────────────

/// One sample of a series. Values are pre-scaled integers; callers agree on
/// the implicit fixed-point scale (e.g. ×1000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
  pub date:  NaiveDate,
  pub value: i64,
}

impl Observation {
  pub fn new(date: NaiveDate, value: i64) -> Self { Self { date, value } }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The opaque key a series is registered under.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SeriesId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for SeriesId {
  fn from(id: &str) -> Self { Self(id.to_owned()) }
}

impl From<String> for SeriesId {
  fn from(id: String) -> Self { Self(id) }
}

/// Whether a series reads a table directly or combines other series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
  Primitive,
  Composed,
}

/// A registered series, as listed by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
  pub id:   SeriesId,
  pub kind: SeriesKind,
}
