//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use strand_core::ErrorKind;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] strand_core::Error),
}

impl ApiError {
  /// Convert a store backend error.
  pub fn store<E: Into<strand_core::Error>>(err: E) -> Self { Self::Engine(err.into()) }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Engine(e) => status_for(e.kind()),
    }
  }
}

fn status_for(kind: ErrorKind) -> StatusCode {
  use ErrorKind::*;
  match kind {
    InvalidArgumentType
    | InvalidArgumentArity
    | UnknownMethod
    | InvalidDateFormat
    | DateRangeInverted
    | MissingWeight
    | NoConstituents
    | DuplicateConstituent
    | MissingTable
    | TableNotFound
    | ColumnNotFound
    | ColumnTypeMismatch
    | InvalidIdentifier
    | NotPrimitive => StatusCode::BAD_REQUEST,
    UnknownSeries | NoDataFound => StatusCode::NOT_FOUND,
    SeriesExists => StatusCode::CONFLICT,
    DivisionByZero | Overflow | CyclicComposition => StatusCode::UNPROCESSABLE_ENTITY,
    ExpectedExactlyOne | InconsistentSeriesLength | BackingStore => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();
    if status.is_server_error() {
      tracing::error!(error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
