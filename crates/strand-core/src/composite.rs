//! Composed series: a weighted sum of other series.
//!
//! Each constituent is evaluated with the same method and query, weighted by
//! `weight / total_weight`, aligned onto the union of all dates by carrying
//! each constituent's last value forward, and summed per date.
//!
//! ```text
//! | date  | A       | B       | composed       |
//! |-------|---------|---------|----------------|
//! | 01jan | -       | b1      | (dropped)      |
//! | 02jan | a2      | -       | a2 + b1        |
//! | 03jan | a3      | b3      | a3 + b3        |
//! | 04jan | -       | b4      | a3 + b4        |
//! ```
//!
//! A date on which some constituent has never reported is dropped, so the
//! composition starts once every constituent has a value.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  fixed::{PRECISION_MAGNIFIER, fraction},
  series::{Observation, SeriesId},
};

const ID_SUFFIX: &str = "_id";
const WEIGHT_SUFFIX: &str = "_weight";

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
  pub id:     SeriesId,
  pub weight: i64,
}

/// Constituents sorted by identifier, with their weight total fixed at
/// construction.
///
/// A zero total is accepted here and fails with [`Error::DivisionByZero`]
/// when the composition is queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionConfig {
  constituents: Vec<Constituent>,
  total_weight: i64,
}

impl CompositionConfig {
  pub fn new(weights: impl IntoIterator<Item = (SeriesId, i64)>) -> Result<Self> {
    let mut constituents: Vec<Constituent> = weights
      .into_iter()
      .map(|(id, weight)| Constituent { id, weight })
      .collect();
    if constituents.is_empty() {
      return Err(Error::NoConstituents);
    }

    constituents.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(pair) = constituents.windows(2).find(|w| w[0].id == w[1].id) {
      return Err(Error::DuplicateConstituent(pair[0].id.clone()));
    }

    let total_weight = constituents
      .iter()
      .try_fold(0i64, |acc, c| acc.checked_add(c.weight))
      .ok_or(Error::Overflow)?;

    Ok(Self { constituents, total_weight })
  }

  /// Build from `<key>_id` / `<key>_weight` metadata pairs, e.g.
  ///
  /// ```text
  /// corn_id:      corn_futures
  /// corn_weight:  1
  /// hotel_id:     us_hotel_price
  /// hotel_weight: 9
  /// ```
  pub fn from_metadata(metadata: &BTreeMap<String, String>) -> Result<Self> {
    let mut weights = Vec::new();
    for (key, id) in metadata {
      let Some(prefix) = key.strip_suffix(ID_SUFFIX) else {
        continue;
      };
      let weight_key = format!("{prefix}{WEIGHT_SUFFIX}");
      let weight = metadata
        .get(&weight_key)
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| Error::MissingWeight(id.clone()))?;
      weights.push((SeriesId::new(id.clone()), weight));
    }
    Self::new(weights)
  }

  pub fn constituents(&self) -> &[Constituent] { &self.constituents }

  pub fn total_weight(&self) -> i64 { self.total_weight }
}

// ─── Series ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeSeries {
  config: CompositionConfig,
}

impl CompositeSeries {
  pub fn new(config: CompositionConfig) -> Self { Self { config } }

  pub fn config(&self) -> &CompositionConfig { &self.config }

  /// Combine constituent series. `resolve` evaluates one constituent; it is
  /// called once per constituent, in identifier order, and any failure
  /// aborts the whole composition.
  pub fn combine_with<F>(&self, mut resolve: F) -> Result<Vec<Observation>>
  where
    F: FnMut(&SeriesId) -> Result<Vec<Observation>>,
  {
    // Failures of the shared denominator are not tied to a constituent.
    let denominator = self
      .config
      .total_weight
      .checked_mul(PRECISION_MAGNIFIER)
      .ok_or(Error::Overflow)?;
    if denominator == 0 {
      return Err(Error::DivisionByZero);
    }

    let mut weighted = Vec::with_capacity(self.config.constituents.len());
    for constituent in &self.config.constituents {
      let raw = resolve(&constituent.id)?;
      let series = weigh(&raw, constituent.weight, self.config.total_weight)
        .map_err(|e| e.in_constituent(&constituent.id))?;
      weighted.push(series);
    }

    let filled = fill_forward(&weighted);
    sum_aligned(&filled)
  }
}

/// Scale every value by `weight / total_weight`, keeping three extra digits
/// through the integer division.
pub fn weigh(
  series: &[Observation],
  weight: i64,
  total_weight: i64,
) -> Result<Vec<Observation>> {
  let numerator = weight.checked_mul(PRECISION_MAGNIFIER).ok_or(Error::Overflow)?;
  let denominator =
    total_weight.checked_mul(PRECISION_MAGNIFIER).ok_or(Error::Overflow)?;

  series
    .iter()
    .map(|o| Ok(Observation::new(o.date, fraction(o.value, numerator, denominator)?)))
    .collect()
}

/// Align every series onto the sorted union of their dates.
///
/// A series missing a date takes its most recent earlier value. Dates before
/// some series' first observation are dropped from every series. All returned
/// series have the same length and the same dates.
pub fn fill_forward(series: &[Vec<Observation>]) -> Vec<Vec<Observation>> {
  let by_date: Vec<BTreeMap<NaiveDate, i64>> = series
    .iter()
    .map(|s| s.iter().map(|o| (o.date, o.value)).collect())
    .collect();
  let all_dates: BTreeSet<NaiveDate> =
    by_date.iter().flat_map(|m| m.keys().copied()).collect();

  let mut last_known: Vec<Option<i64>> = vec![None; series.len()];
  let mut filled: Vec<Vec<Observation>> =
    vec![Vec::with_capacity(all_dates.len()); series.len()];
  let mut dropped = 0usize;

  for date in all_dates {
    let mut complete = true;
    for (idx, values) in by_date.iter().enumerate() {
      if let Some(value) = values.get(&date) {
        last_known[idx] = Some(*value);
      } else if last_known[idx].is_none() {
        complete = false;
      }
    }

    if !complete {
      dropped += 1;
      continue;
    }
    for (idx, value) in last_known.iter().enumerate() {
      if let Some(value) = value {
        filled[idx].push(Observation::new(date, *value));
      }
    }
  }

  if dropped > 0 {
    debug!(dropped, "dropped dates before every constituent reported");
  }
  filled
}

fn sum_aligned(filled: &[Vec<Observation>]) -> Result<Vec<Observation>> {
  let Some(first) = filled.first() else {
    return Ok(Vec::new());
  };

  let mut totals: Vec<Observation> =
    first.iter().map(|o| Observation::new(o.date, 0)).collect();
  for series in filled {
    if series.len() != totals.len() {
      return Err(Error::InconsistentSeriesLength);
    }
    for (total, o) in totals.iter_mut().zip(series) {
      if total.date != o.date {
        return Err(Error::InconsistentSeriesLength);
      }
      total.value = total.value.checked_add(o.value).ok_or(Error::Overflow)?;
    }
  }
  Ok(totals)
}
