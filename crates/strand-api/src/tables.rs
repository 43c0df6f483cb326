//! Handler for `POST /tables`: provisions a table with the default primitive
//! layout.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use strand_core::store::SeriesStore;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub table_name: String,
}

/// `POST /tables`, body: `{"table_name":"cpi"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SeriesStore,
{
  store
    .create_primitive_table(body.table_name.clone())
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(json!({ "table_name": body.table_name }))))
}
