//! The `SeriesStore` trait.
//!
//! Implemented by storage backends (e.g. `strand-store-sqlite`). Higher
//! layers (`strand-api`, `strand-server`) depend on this abstraction, not on
//! any concrete backend.

use std::{collections::BTreeMap, future::Future};

use chrono::{DateTime, Utc};

use crate::{
  query::{Method, Query},
  series::{Observation, SeriesId, SeriesInfo},
};

/// Abstraction over a Strand store backend.
///
/// Registration validates a definition once and persists it; definitions
/// are immutable afterwards. Queries are read-only and deterministic: the
/// same call against the same rows always yields the same series.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SeriesStore: Send + Sync {
  /// Backend errors must convert into the engine's error so callers can
  /// classify failures by [`crate::ErrorKind`].
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Tables ────────────────────────────────────────────────────────────

  /// Create a table with the default primitive layout (`date_value TEXT`,
  /// `value INTEGER`, `created_at TEXT`). Idempotent.
  fn create_primitive_table(
    &self,
    table: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Registration ──────────────────────────────────────────────────────

  /// Register a primitive series from `table_name` / `date_column` /
  /// `value_column` / `created_at_column` metadata, validated against the
  /// store's schema.
  fn register_primitive(
    &self,
    id: SeriesId,
    metadata: BTreeMap<String, String>,
  ) -> impl Future<Output = Result<SeriesInfo, Self::Error>> + Send + '_;

  /// Register a composed series from `<key>_id` / `<key>_weight` pairs.
  /// Constituents are resolved when the series is queried.
  fn register_composed(
    &self,
    id: SeriesId,
    metadata: BTreeMap<String, String>,
  ) -> impl Future<Output = Result<SeriesInfo, Self::Error>> + Send + '_;

  /// All registered series, ordered by identifier.
  fn list_series(
    &self,
  ) -> impl Future<Output = Result<Vec<SeriesInfo>, Self::Error>> + Send + '_;

  // ── Observations ──────────────────────────────────────────────────────

  /// Append an observation to a primitive series, stamped with the given
  /// creation time. A later creation time wins over earlier rows that share
  /// the date.
  fn record_observation_at(
    &self,
    id: SeriesId,
    observation: Observation,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append an observation stamped with the current time.
  fn record_observation(
    &self,
    id: SeriesId,
    observation: Observation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    self.record_observation_at(id, observation, Utc::now())
  }

  // ── Queries ───────────────────────────────────────────────────────────

  /// Evaluate `method` for `query` on series `id`.
  fn call(
    &self,
    id: SeriesId,
    method: Method,
    query: Query,
  ) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send + '_;
}
