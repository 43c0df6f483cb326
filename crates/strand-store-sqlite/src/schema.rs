//! SQL schema for the Strand SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Catalogue DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per registered series. Definitions are validated before they are
-- written and never updated afterwards.
CREATE TABLE IF NOT EXISTS series (
    series_id       TEXT PRIMARY KEY,
    kind            TEXT NOT NULL,   -- 'primitive' | 'composed'
    definition_json TEXT NOT NULL,   -- serialised strand_core::registry::Series
    registered_at   TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";

/// DDL for a primitive table with the default column layout. `table` must
/// already be a validated identifier.
pub fn primitive_table(table: &str) -> String {
  format!(
    "
CREATE TABLE IF NOT EXISTS \"{table}\" (
    date_value TEXT    NOT NULL,  -- YYYY-MM-DD
    value      INTEGER NOT NULL,  -- pre-scaled fixed-point value
    created_at TEXT    NOT NULL   -- fixed-width RFC 3339 UTC; breaks same-date ties
);

CREATE INDEX IF NOT EXISTS \"{table}_date_idx\" ON \"{table}\"(date_value, created_at);
"
  )
}
