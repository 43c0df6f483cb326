//! Primitive series: observations read straight from one table.
//!
//! A sparse table behaves as a step function. A query for a date with no row
//! of its own carries the last known value forward, re-labelled with the
//! requested date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  config::SeriesConfig,
  fixed::{INDEX_SCALE, fraction_toward_zero},
  query::{Method, Query, Resolution},
  series::Observation,
  source::{Lookup, ObservationSource, RecordedObservation},
};

/// A series backed directly by a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimitiveSeries {
  config: SeriesConfig,
}

impl PrimitiveSeries {
  pub fn new(config: SeriesConfig) -> Self { Self { config } }

  pub fn config(&self) -> &SeriesConfig { &self.config }

  pub fn call<S: ObservationSource>(
    &self,
    source: &S,
    method: Method,
    query: &Query,
  ) -> Result<Vec<Observation>> {
    match method {
      Method::Value => self.value(source, query),
      Method::Index => self.index(source, query),
    }
  }

  /// Resolve the observation(s) for `query`, with as-of backfill.
  pub fn value<S: ObservationSource>(
    &self,
    source: &S,
    query: &Query,
  ) -> Result<Vec<Observation>> {
    let (mut values, backfill_for) = match query.resolution() {
      Resolution::Base => {
        (self.single(source, Lookup::BaseValue, "base value")?, None)
      }
      Resolution::Latest => {
        (self.single(source, Lookup::Latest, "latest value")?, None)
      }
      Resolution::Exact(date) => (
        latest_created_per_date(self.fetch(source, Lookup::Exact(date))?),
        Some(date),
      ),
      Resolution::Range { from, to } => (
        latest_created_per_date(self.fetch(source, Lookup::Range { from, to })?),
        Some(from),
      ),
    };

    if let Some(date) = backfill_for
      && values.first().map(|o| o.date) != Some(date)
    {
      let before = self.single(
        source,
        Lookup::OnOrBefore(date),
        "last value before requested date",
      )?;
      if let Some(carried) = before.first() {
        debug!(
          table = self.config.table(),
          %date,
          from = %carried.date,
          "carrying value forward"
        );
        values.insert(0, Observation::new(date, carried.value));
      }
    }

    if values.is_empty() {
      return Err(Error::NoDataFound);
    }
    Ok(values)
  }

  /// `current * 100000 / base`, where base is the earliest nonzero value.
  pub fn index<S: ObservationSource>(
    &self,
    source: &S,
    query: &Query,
  ) -> Result<Vec<Observation>> {
    let bases = self.value(source, &Query::earliest())?;
    let [base] = bases[..] else {
      return Err(Error::ExpectedExactlyOne { what: "base value", got: bases.len() });
    };

    let current = self.value(source, query)?;
    if query.is_single_point() && current.len() != 1 {
      return Err(Error::ExpectedExactlyOne {
        what: "current value",
        got:  current.len(),
      });
    }

    current
      .into_iter()
      .map(|o| {
        let index = fraction_toward_zero(o.value, INDEX_SCALE, base.value)?;
        Ok(Observation::new(o.date, index))
      })
      .collect()
  }

  fn fetch<S: ObservationSource>(
    &self,
    source: &S,
    lookup: Lookup,
  ) -> Result<Vec<RecordedObservation>> {
    source.fetch(&self.config, lookup).map_err(Error::backing_store)
  }

  /// A lookup that yields zero or one row.
  fn single<S: ObservationSource>(
    &self,
    source: &S,
    lookup: Lookup,
    what: &'static str,
  ) -> Result<Vec<Observation>> {
    let rows = self.fetch(source, lookup)?;
    if rows.len() > 1 {
      return Err(Error::ExpectedExactlyOne { what, got: rows.len() });
    }
    Ok(rows.into_iter().map(|r| Observation::new(r.date, r.value)).collect())
  }
}

/// Collapse rows to one per date, keeping the latest created (the later row
/// wins an exact tie). Output is ascending by date regardless of input order.
fn latest_created_per_date(rows: Vec<RecordedObservation>) -> Vec<Observation> {
  let mut latest: BTreeMap<NaiveDate, RecordedObservation> = BTreeMap::new();
  for row in rows {
    match latest.get(&row.date) {
      Some(kept) if kept.created_at > row.created_at => {}
      _ => {
        latest.insert(row.date, row);
      }
    }
  }
  latest
    .into_values()
    .map(|r| Observation::new(r.date, r.value))
    .collect()
}
