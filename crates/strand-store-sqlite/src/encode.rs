//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, so text order is date order. Creation
//! times are fixed-width RFC 3339 UTC strings with microseconds, so text
//! order is creation order. Series definitions are stored as compact JSON.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use strand_core::{
  config::ColumnType,
  query::DATE_FORMAT,
  registry::Series,
  series::{SeriesId, SeriesInfo, SeriesKind},
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

/// Decode a date cell read from column `idx`.
pub fn decode_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn encode_created_at(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ─── SeriesKind ──────────────────────────────────────────────────────────────

pub fn encode_kind(kind: SeriesKind) -> &'static str {
  match kind {
    SeriesKind::Primitive => "primitive",
    SeriesKind::Composed => "composed",
  }
}

pub fn decode_kind(s: &str) -> Result<SeriesKind> {
  match s {
    "primitive" => Ok(SeriesKind::Primitive),
    "composed" => Ok(SeriesKind::Composed),
    other => Err(Error::UnknownKind(other.to_owned())),
  }
}

// ─── Column types ────────────────────────────────────────────────────────────

/// Classify a declared column type using SQLite's affinity rules.
pub fn column_type(declared: &str) -> ColumnType {
  let upper = declared.to_ascii_uppercase();
  if upper.contains("INT") {
    ColumnType::Integer
  } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
    ColumnType::Text
  } else {
    ColumnType::Other(upper)
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `series` row.
pub struct RawSeries {
  pub series_id:       String,
  pub kind:            String,
  pub definition_json: String,
}

impl RawSeries {
  pub fn into_info(self) -> Result<SeriesInfo> {
    Ok(SeriesInfo {
      id:   SeriesId::new(self.series_id),
      kind: decode_kind(&self.kind)?,
    })
  }

  pub fn into_series(self) -> Result<(SeriesId, Series)> {
    let series: Series = serde_json::from_str(&self.definition_json)?;
    Ok((SeriesId::new(self.series_id), series))
  }
}
