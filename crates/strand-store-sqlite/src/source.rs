//! Row lookups for primitive series and schema introspection, both running
//! synchronously on the connection thread.

use rusqlite::{Connection, Row, params};
use strand_core::{
  config::{ColumnSchema, SeriesConfig, TableSchema},
  source::{Lookup, ObservationSource, RecordedObservation},
};

use crate::encode::{column_type, decode_date, encode_date};

// ─── ConnectionSource ────────────────────────────────────────────────────────

/// An [`ObservationSource`] over a borrowed connection.
pub struct ConnectionSource<'c> {
  conn: &'c Connection,
}

impl<'c> ConnectionSource<'c> {
  pub fn new(conn: &'c Connection) -> Self { Self { conn } }

  pub fn conn(&self) -> &'c Connection { self.conn }
}

impl ObservationSource for ConnectionSource<'_> {
  type Error = rusqlite::Error;

  fn fetch(
    &self,
    config: &SeriesConfig,
    lookup: Lookup,
  ) -> rusqlite::Result<Vec<RecordedObservation>> {
    // Identifiers were validated at registration, so quoting is enough.
    let d = config.date_column();
    let v = config.value_column();
    let c = config.created_at_column();
    let select = format!("SELECT \"{d}\", \"{v}\", \"{c}\" FROM \"{}\"", config.table());

    match lookup {
      Lookup::BaseValue => query(
        self.conn,
        &format!(
          "{select} WHERE \"{v}\" != 0 ORDER BY \"{d}\" ASC, \"{c}\" DESC LIMIT 1"
        ),
        params![],
      ),
      Lookup::Latest => query(
        self.conn,
        &format!("{select} ORDER BY \"{d}\" DESC, \"{c}\" DESC LIMIT 1"),
        params![],
      ),
      Lookup::Exact(date) => query(
        self.conn,
        &format!("{select} WHERE \"{d}\" = ?1 ORDER BY \"{c}\" DESC LIMIT 1"),
        params![encode_date(date)],
      ),
      Lookup::OnOrBefore(date) => query(
        self.conn,
        &format!(
          "{select} WHERE \"{d}\" <= ?1 ORDER BY \"{d}\" DESC, \"{c}\" DESC LIMIT 1"
        ),
        params![encode_date(date)],
      ),
      Lookup::Range { from, to } => query(
        self.conn,
        &format!(
          "{select} WHERE \"{d}\" >= ?1 AND \"{d}\" <= ?2 ORDER BY \"{d}\" ASC, \"{c}\" DESC"
        ),
        params![encode_date(from), encode_date(to)],
      ),
    }
  }
}

fn query(
  conn: &Connection,
  sql: &str,
  params: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<RecordedObservation>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(params, recorded_observation)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn recorded_observation(row: &Row<'_>) -> rusqlite::Result<RecordedObservation> {
  let date: String = row.get(0)?;
  Ok(RecordedObservation {
    date:       decode_date(0, &date)?,
    value:      row.get(1)?,
    created_at: row.get(2)?,
  })
}

// ─── Introspection ───────────────────────────────────────────────────────────

/// Every user table in the database with its declared column types.
pub fn table_schemas(conn: &Connection) -> rusqlite::Result<Vec<TableSchema>> {
  let names = {
    let mut stmt = conn.prepare(
      "SELECT name FROM sqlite_master
       WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
       ORDER BY name",
    )?;
    stmt
      .query_map([], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  names
    .into_iter()
    .map(|name| {
      let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{}\")", name.replace('"', "\"\"")))?;
      let columns = stmt
        .query_map([], |row| {
          let declared: String = row.get(2)?;
          Ok(ColumnSchema {
            name: row.get(1)?,
            ty:   column_type(&declared),
          })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(TableSchema { name, columns })
    })
    .collect()
}
