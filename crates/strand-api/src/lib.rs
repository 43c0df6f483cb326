//! JSON REST API for Strand.
//!
//! Exposes an axum [`Router`] backed by any [`strand_core::store::SeriesStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", strand_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod math;
pub mod series;
pub mod tables;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use strand_core::store::SeriesStore;

pub use error::ApiError;
pub use series::ResultSet;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SeriesStore + 'static,
{
  Router::new()
    // Series
    .route("/series", get(series::list::<S>))
    .route("/series/primitive", post(series::register_primitive::<S>))
    .route("/series/composed", post(series::register_composed::<S>))
    .route("/series/{id}/observations", post(series::record::<S>))
    .route("/series/{id}/call", post(series::call_untyped::<S>))
    .route("/series/{id}/{method}", get(series::call::<S>))
    // Tables
    .route("/tables", post(tables::create::<S>))
    // Math
    .route("/math/fraction", get(math::fraction))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use strand_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
  }

  fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  /// Provision, register and fill a primitive series.
  async fn seed(app: &Router, id: &str, rows: &[(&str, i64)]) {
    let (status, _) = send(app, post("/tables", json!({ "table_name": id }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
      app,
      post("/series/primitive", json!({ "id": id, "metadata": { "table_name": id } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for (date, value) in rows {
      let (status, _) = send(
        app,
        post(&format!("/series/{id}/observations"), json!({ "date": date, "value": value })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }
  }

  #[tokio::test]
  async fn primitive_round_trip() {
    let app = app().await;
    seed(&app, "cpi", &[("2000-01-01", 100)]).await;

    let (status, body) = send(&app, get("/series/cpi/get_value?date=2000-02-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
      body,
      json!({ "columns": ["date", "value"], "rows": [["2000-02-01", 100]] })
    );

    let (status, body) = send(&app, get("/series/cpi/get_index?date=0000-00-00")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], json!([["2000-01-01", 100000]]));

    let (status, body) = send(&app, get("/series")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": "cpi", "kind": "primitive" }]));
  }

  #[tokio::test]
  async fn composed_over_http() {
    let app = app().await;
    seed(&app, "a", &[("2024-01-01", 10), ("2024-01-02", 20)]).await;
    seed(&app, "b", &[("2024-01-01", 0), ("2024-01-02", 0)]).await;

    let (status, body) = send(
      &app,
      post(
        "/series/composed",
        json!({
          "id": "c",
          "metadata": { "a_id": "a", "a_weight": "1", "b_id": "b", "b_weight": "9" },
        }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": "c", "kind": "composed" }));

    let (status, body) = send(
      &app,
      post("/series/c/call", json!({ "method": "get_value", "args": ["2024-01-01", "2024-01-02"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], json!([["2024-01-01", 1], ["2024-01-02", 2]]));
  }

  #[tokio::test]
  async fn validation_errors_are_bad_requests() {
    let app = app().await;
    seed(&app, "a", &[("2024-01-01", 10)]).await;

    let (status, body) = send(&app, get("/series/a/get_everything")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown method: get_everything");

    let (status, _) = send(&app, get("/series/a/get_value?date=2024-1-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
      send(&app, get("/series/a/get_value?date=2024-01-02&date_to=2024-01-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
      send(&app, post("/series/a/call", json!({ "method": "get_value", "args": [""] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "expected 2 arguments, got 1");

    let (status, _) =
      send(&app, post("/series/a/call", json!({ "method": "get_value", "args": [1, null] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn missing_data_and_series_are_not_found() {
    let app = app().await;
    seed(&app, "a", &[("2024-01-05", 10)]).await;

    let (status, body) = send(&app, get("/series/a/get_value?date=2024-01-01")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no data found");

    let (status, _) = send(&app, get("/series/nope/get_value")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn duplicate_registration_conflicts() {
    let app = app().await;
    seed(&app, "a", &[]).await;

    let (status, _) = send(
      &app,
      post("/series/primitive", json!({ "id": "a", "metadata": { "table_name": "a" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn fraction_endpoint() {
    let app = app().await;

    let (status, body) =
      send(&app, get("/math/fraction?value=200000&numerator=100000&denominator=75000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": 266666 }));

    let (status, body) =
      send(&app, get("/math/fraction?value=1&numerator=1&denominator=0")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "denominator cannot be zero");
  }
}
