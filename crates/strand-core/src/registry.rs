//! Series definitions keyed by identifier, and the recursive evaluation of
//! a call against them.
//!
//! Definitions are looked up through a [`Catalogue`], one identifier at a
//! time, so a call only touches the series it actually reaches.

use std::{collections::BTreeMap, convert::Infallible};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Error, Result,
  composite::CompositeSeries,
  primitive::PrimitiveSeries,
  query::{Method, Query},
  series::{Observation, SeriesId, SeriesKind},
  source::ObservationSource,
};

/// A registered series definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "config", rename_all = "snake_case")]
pub enum Series {
  Primitive(PrimitiveSeries),
  Composed(CompositeSeries),
}

impl Series {
  pub fn kind(&self) -> SeriesKind {
    match self {
      Self::Primitive(_) => SeriesKind::Primitive,
      Self::Composed(_) => SeriesKind::Composed,
    }
  }
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

/// Where definitions come from during evaluation.
pub trait Catalogue {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The definition registered under `id`, if any.
  fn definition(&self, id: &SeriesId) -> Result<Option<Series>, Self::Error>;
}

/// An in-memory catalogue, ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct Registry {
  series: BTreeMap<SeriesId, Series>,
}

impl Registry {
  pub fn new() -> Self { Self::default() }

  /// Add a definition. Identifiers are unique.
  pub fn insert(&mut self, id: SeriesId, series: Series) -> Result<()> {
    if self.series.contains_key(&id) {
      return Err(Error::SeriesExists(id));
    }
    self.series.insert(id, series);
    Ok(())
  }

  pub fn get(&self, id: &SeriesId) -> Option<&Series> { self.series.get(id) }

  pub fn evaluate<S: ObservationSource>(
    &self,
    source: &S,
    id: &SeriesId,
    method: Method,
    query: &Query,
  ) -> Result<Vec<Observation>> {
    evaluate(self, source, id, method, query)
  }
}

impl Catalogue for Registry {
  type Error = Infallible;

  fn definition(&self, id: &SeriesId) -> Result<Option<Series>, Infallible> {
    Ok(self.series.get(id).cloned())
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Evaluate `method` on series `id`, recursing through compositions.
///
/// Constituent failures come back wrapped with the constituent's
/// identifier. A composition that reaches itself fails with
/// [`Error::CyclicComposition`].
pub fn evaluate<C, S>(
  catalogue: &C,
  source: &S,
  id: &SeriesId,
  method: Method,
  query: &Query,
) -> Result<Vec<Observation>>
where
  C: Catalogue,
  S: ObservationSource,
{
  Evaluation { catalogue, source, method, query, path: Vec::new() }.eval(id)
}

/// State of one top-level call: the chain of series currently being
/// evaluated, outermost first.
struct Evaluation<'a, C, S> {
  catalogue: &'a C,
  source:    &'a S,
  method:    Method,
  query:     &'a Query,
  path:      Vec<SeriesId>,
}

impl<C: Catalogue, S: ObservationSource> Evaluation<'_, C, S> {
  fn eval(&mut self, id: &SeriesId) -> Result<Vec<Observation>> {
    if self.path.contains(id) {
      return Err(Error::CyclicComposition(id.clone()));
    }
    let series = self
      .catalogue
      .definition(id)
      .map_err(Error::backing_store)?
      .ok_or_else(|| Error::UnknownSeries(id.clone()))?;

    debug!(
      series = %id,
      kind = ?series.kind(),
      method = %self.method,
      query = %self.query,
      depth = self.path.len(),
      "evaluating series"
    );

    self.path.push(id.clone());
    let result = match &series {
      Series::Primitive(primitive) => {
        primitive.call(self.source, self.method, self.query)
      }
      Series::Composed(composite) => composite.combine_with(|constituent| {
        self.eval(constituent).map_err(|e| e.in_constituent(constituent))
      }),
    };
    self.path.pop();
    result
  }
}
