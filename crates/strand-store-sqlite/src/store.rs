//! [`SqliteStore`]: the SQLite implementation of [`SeriesStore`].

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use tracing::{debug, info};

use strand_core::{
  composite::{CompositeSeries, CompositionConfig},
  config::{SeriesConfig, ensure_identifier},
  primitive::PrimitiveSeries,
  query::{Method, Query},
  registry::{Catalogue, Series, evaluate},
  series::{Observation, SeriesId, SeriesInfo},
  store::SeriesStore,
};

use crate::{
  Result,
  encode::{RawSeries, encode_created_at, encode_date, encode_kind},
  schema::{SCHEMA, primitive_table},
  source::{ConnectionSource, table_schemas},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Strand series store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .with_conn(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread, keeping its error type intact.
  pub(crate) async fn with_conn<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut Connection) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── Catalogue helpers ───────────────────────────────────────────────────────

fn load_series(conn: &Connection, id: &SeriesId) -> Result<Option<Series>> {
  let raw: Option<RawSeries> = conn
    .query_row(
      "SELECT series_id, kind, definition_json FROM series WHERE series_id = ?1",
      rusqlite::params![id.as_str()],
      raw_series,
    )
    .optional()?;

  raw
    .map(|raw| raw.into_series().map(|(_, series)| series))
    .transpose()
}

fn load_raw_series(conn: &Connection) -> Result<Vec<RawSeries>> {
  let mut stmt = conn.prepare(
    "SELECT series_id, kind, definition_json FROM series ORDER BY series_id",
  )?;
  let raws = stmt
    .query_map([], raw_series)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(raws)
}

/// Definitions are read one identifier at a time while a call evaluates.
impl Catalogue for ConnectionSource<'_> {
  type Error = crate::Error;

  fn definition(&self, id: &SeriesId) -> Result<Option<Series>> { load_series(self.conn(), id) }
}

fn raw_series(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSeries> {
  Ok(RawSeries {
    series_id:       row.get(0)?,
    kind:            row.get(1)?,
    definition_json: row.get(2)?,
  })
}

/// Persist a validated definition. Identifiers are unique.
fn insert_definition(conn: &Connection, id: SeriesId, series: Series) -> Result<SeriesInfo> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM series WHERE series_id = ?1",
      rusqlite::params![id.as_str()],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if exists {
    return Err(strand_core::Error::SeriesExists(id).into());
  }

  let kind = series.kind();
  conn.execute(
    "INSERT INTO series (series_id, kind, definition_json, registered_at)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      id.as_str(),
      encode_kind(kind),
      serde_json::to_string(&series)?,
      encode_created_at(Utc::now()),
    ],
  )?;

  info!(series = %id, ?kind, "registered series");
  Ok(SeriesInfo { id, kind })
}

// ─── SeriesStore impl ────────────────────────────────────────────────────────

impl SeriesStore for SqliteStore {
  type Error = crate::Error;

  // ── Tables ────────────────────────────────────────────────────────────────

  async fn create_primitive_table(&self, table: String) -> Result<()> {
    ensure_identifier(&table)?;
    self
      .with_conn(move |conn| {
        conn.execute_batch(&primitive_table(&table))?;
        info!(%table, "created primitive table");
        Ok(())
      })
      .await
  }

  // ── Registration ──────────────────────────────────────────────────────────

  async fn register_primitive(
    &self,
    id:       SeriesId,
    metadata: BTreeMap<String, String>,
  ) -> Result<SeriesInfo> {
    self
      .with_conn(move |conn| {
        let tables = table_schemas(conn)?;
        let config = SeriesConfig::from_metadata(&metadata, &tables)?;
        insert_definition(conn, id, Series::Primitive(PrimitiveSeries::new(config)))
      })
      .await
  }

  async fn register_composed(
    &self,
    id:       SeriesId,
    metadata: BTreeMap<String, String>,
  ) -> Result<SeriesInfo> {
    let config = CompositionConfig::from_metadata(&metadata)?;
    self
      .with_conn(move |conn| {
        insert_definition(conn, id, Series::Composed(CompositeSeries::new(config)))
      })
      .await
  }

  async fn list_series(&self) -> Result<Vec<SeriesInfo>> {
    let raws = self.with_conn(|conn| load_raw_series(conn)).await?;
    raws.into_iter().map(RawSeries::into_info).collect()
  }

  // ── Observations ──────────────────────────────────────────────────────────

  async fn record_observation_at(
    &self,
    id:          SeriesId,
    observation: Observation,
    created_at:  DateTime<Utc>,
  ) -> Result<()> {
    let date_str       = encode_date(observation.date);
    let created_at_str = encode_created_at(created_at);

    self
      .with_conn(move |conn| {
        let config = match load_series(conn, &id)? {
          Some(Series::Primitive(primitive)) => primitive.config().clone(),
          Some(Series::Composed(_)) => {
            return Err(strand_core::Error::NotPrimitive(id).into());
          }
          None => return Err(strand_core::Error::UnknownSeries(id).into()),
        };

        conn.execute(
          &format!(
            "INSERT INTO \"{}\" (\"{}\", \"{}\", \"{}\") VALUES (?1, ?2, ?3)",
            config.table(),
            config.date_column(),
            config.value_column(),
            config.created_at_column(),
          ),
          rusqlite::params![date_str, observation.value, created_at_str],
        )?;

        debug!(series = %id, date = %date_str, value = observation.value, "recorded observation");
        Ok(())
      })
      .await
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn call(
    &self,
    id:     SeriesId,
    method: Method,
    query:  Query,
  ) -> Result<Vec<Observation>> {
    self
      .with_conn(move |conn| {
        let source = ConnectionSource::new(conn);
        let rows   = evaluate(&source, &source, &id, method, &query)?;
        debug!(series = %id, %method, %query, rows = rows.len(), "call complete");
        Ok(rows)
      })
      .await
  }
}
