//! Error type for `strand-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] strand_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The `kind` column of the catalogue held an unexpected value.
  #[error("unknown series kind: {0:?}")]
  UnknownKind(String),
}

impl From<Error> for strand_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(e) => e,
      other => strand_core::Error::backing_store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
