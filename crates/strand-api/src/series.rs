//! Handlers for `/series` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/series` | Ordered by identifier |
//! | `POST` | `/series/primitive` | Body: `{"id":"cpi","metadata":{"table_name":"cpi"}}` |
//! | `POST` | `/series/composed` | Body: `{"id":"basket","metadata":{"cpi_id":"cpi","cpi_weight":"1"}}` |
//! | `POST` | `/series/{id}/observations` | Body: `{"date":"2024-01-01","value":100}` |
//! | `GET`  | `/series/{id}/{method}` | `?date=YYYY-MM-DD&date_to=YYYY-MM-DD` |
//! | `POST` | `/series/{id}/call` | Body: `{"method":"get_index","args":["2024-01-01",null]}` |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query as QueryParams, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strand_core::{
  query::{Method, Query, parse_date},
  series::{Observation, SeriesId, SeriesInfo},
  store::SeriesStore,
};

use crate::error::ApiError;

// ─── Result relation ─────────────────────────────────────────────────────────

/// The two-column `(date, value)` relation a series call produces.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSet {
  pub columns: Vec<String>,
  pub rows:    Vec<(NaiveDate, i64)>,
}

impl From<Vec<Observation>> for ResultSet {
  fn from(observations: Vec<Observation>) -> Self {
    Self {
      columns: vec!["date".to_owned(), "value".to_owned()],
      rows:    observations.into_iter().map(|o| (o.date, o.value)).collect(),
    }
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /series`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<SeriesInfo>>, ApiError>
where
  S: SeriesStore,
{
  let series = store.list_series().await.map_err(ApiError::store)?;
  Ok(Json(series))
}

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub id:       SeriesId,
  #[serde(default)]
  pub metadata: BTreeMap<String, String>,
}

/// `POST /series/primitive`
pub async fn register_primitive<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SeriesStore,
{
  let info = store
    .register_primitive(body.id, body.metadata)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(info)))
}

/// `POST /series/composed`
pub async fn register_composed<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SeriesStore,
{
  let info = store
    .register_composed(body.id, body.metadata)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(info)))
}

// ─── Observations ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ObservationBody {
  pub date:  String,
  pub value: i64,
}

/// `POST /series/{id}/observations`
pub async fn record<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<SeriesId>,
  Json(body): Json<ObservationBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SeriesStore,
{
  let observation = Observation::new(parse_date(&body.date)?, body.value);
  store
    .record_observation(id, observation)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(observation)))
}

// ─── Calls ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CallParams {
  pub date:    Option<String>,
  pub date_to: Option<String>,
}

/// `GET /series/{id}/{method}[?date=..&date_to=..]`
///
/// A missing `date` means the latest observation; `0000-00-00` means the
/// base (earliest nonzero) observation.
pub async fn call<S>(
  State(store): State<Arc<S>>,
  Path((id, method)): Path<(SeriesId, String)>,
  QueryParams(params): QueryParams<CallParams>,
) -> Result<Json<ResultSet>, ApiError>
where
  S: SeriesStore,
{
  let method: Method = method.parse()?;
  let query = Query::parse(params.date.as_deref().unwrap_or(""), params.date_to.as_deref())?;
  let rows = store.call(id, method, query).await.map_err(ApiError::store)?;
  Ok(Json(rows.into()))
}

#[derive(Debug, Deserialize)]
pub struct CallBody {
  pub method: String,
  #[serde(default)]
  pub args:   Vec<Value>,
}

/// `POST /series/{id}/call`: positional JSON arguments, validated for arity
/// and type.
pub async fn call_untyped<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<SeriesId>,
  Json(body): Json<CallBody>,
) -> Result<Json<ResultSet>, ApiError>
where
  S: SeriesStore,
{
  let method: Method = body.method.parse()?;
  let query = Query::from_args(&body.args)?;
  let rows = store.call(id, method, query).await.map_err(ApiError::store)?;
  Ok(Json(rows.into()))
}
