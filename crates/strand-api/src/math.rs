//! `GET /math/fraction?value=&numerator=&denominator=`
//!
//! Exposes the truncating fixed-point fraction used throughout the engine.

use axum::{Json, extract::Query};
use serde::{Deserialize, Serialize};
use strand_core::fixed;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FractionParams {
  pub value:       i64,
  pub numerator:   i64,
  pub denominator: i64,
}

#[derive(Debug, Serialize)]
pub struct FractionResult {
  pub result: i64,
}

pub async fn fraction(
  Query(params): Query<FractionParams>,
) -> Result<Json<FractionResult>, ApiError> {
  let result = fixed::fraction(params.value, params.numerator, params.denominator)?;
  Ok(Json(FractionResult { result }))
}
