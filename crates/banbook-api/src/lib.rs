//! JSON REST API for banbook.
//!
//! Exposes an axum [`Router`] backed by any [`banbook_core::store::CrmStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", banbook_api::api_router(store.clone()))
//! ```

pub mod clients;
pub mod envelope;
pub mod error;
pub mod import;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json,
  Router,
  extract::{DefaultBodyLimit, State},
  routing::{get, post},
};
use banbook_core::store::CrmStore;
use serde::{Deserialize, Serialize};

pub use envelope::{Envelope, Pagination};
pub use error::ApiError;

/// Uploads above this size are rejected outright.
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `BANBOOK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CrmStore + 'static,
{
  Router::new()
    .route("/health", get(health::<S>))
    .route("/import/upload", post(import::upload))
    .route("/import/save", post(import::save::<S>))
    .route("/clients/incomplete", get(clients::incomplete::<S>))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .with_state(store)
}

// ─── Health ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct HealthData {
  status:      &'static str,
  clients:     u64,
  bans:        u64,
  subscribers: u64,
}

/// `GET /health` — liveness probe that also exercises the store.
async fn health<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Envelope<HealthData>>, ApiError>
where
  S: CrmStore,
{
  let counts = store
    .counts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(Envelope::ok(HealthData {
    status:      "ok",
    clients:     counts.clients,
    bans:        counts.bans,
    subscribers: counts.subscribers,
  })))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use banbook_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn test_router() -> (Router, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    (api_router(store.clone()), store)
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn multipart_csv(csv: &str) -> (String, String) {
    let boundary = "banbook-test-boundary";
    let body = format!(
      "--{boundary}\r\n\
       Content-Disposition: form-data; name=\"file\"; filename=\"upload.csv\"\r\n\
       Content-Type: text/csv\r\n\r\n\
       {csv}\r\n\
       --{boundary}--\r\n"
    );
    (format!("multipart/form-data; boundary={boundary}"), body)
  }

  fn save_body(rows: Value) -> Value {
    json!({
      "table": "accounts",
      "rows": rows,
      "mapping": {
        "ban": "BAN",
        "sub": "SUB",
        "status": "STATUS",
        "plan": "plan",
        "base": "BASE",
        "business_name": "Razon Social",
      },
      "upsertKey": "ban_number",
    })
  }

  async fn post_json(router: Router, uri: &str, body: Value) -> axum::response::Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    router.oneshot(req).await.unwrap()
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_answers_in_the_envelope() {
    let (router, _) = test_router().await;
    let req = Request::builder()
      .uri("/health")
      .body(Body::empty())
      .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
    assert_eq!(body["data"]["clients"], json!(0));
  }

  // ── Upload ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn upload_returns_headers_mapping_and_sample() {
    let (router, _) = test_router().await;
    let csv = "CELULAR,PLAN,VALOR,MESES,NOTAS\n\
               787-555-0001,Business 5GB,\"39,99\",24,\n\
               787-555-0002,Business 10GB,45.50,12,porta";
    let (content_type, body) = multipart_csv(csv);

    let req = Request::builder()
      .method("POST")
      .uri("/import/upload")
      .header(header::CONTENT_TYPE, content_type)
      .body(Body::from(body))
      .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["header_row"], json!(0));
    assert_eq!(body["data"]["headers"][0], json!("CELULAR"));
    assert_eq!(body["data"]["sample"].as_array().unwrap().len(), 2);

    let columns = body["data"]["columns"].as_array().unwrap();
    let phone = columns.iter().find(|c| c["field"] == "phone").unwrap();
    assert_eq!(phone["origin"], json!("keyword"));
    assert_eq!(phone["index"], json!(0));
  }

  #[tokio::test]
  async fn upload_rejects_unknown_extensions() {
    let (router, _) = test_router().await;
    let boundary = "banbook-test-boundary";
    let body = format!(
      "--{boundary}\r\n\
       Content-Disposition: form-data; name=\"file\"; filename=\"a.pdf\"\r\n\r\n\
       not a sheet\r\n\
       --{boundary}--\r\n"
    );

    let req = Request::builder()
      .method("POST")
      .uri("/import/upload")
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={boundary}"),
      )
      .body(Body::from(body))
      .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(false));
  }

  // ── Save ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn save_imports_accounts_and_reruns_skip() {
    let (router, store) = test_router().await;
    let rows = json!([
      { "BAN": "900012345", "SUB": "7871234567", "STATUS": "A",
        "plan": "X", "BASE": "B", "Razon Social": "" },
    ]);

    let resp = post_json(router.clone(), "/import/save", save_body(rows.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["inserted"], json!(1));

    // The client took its name from the BAN and shows up as incomplete.
    use banbook_core::store::{ClientQuery, CrmStore as _};
    let incomplete = store
      .list_clients(&ClientQuery { incomplete_only: true, ..Default::default() })
      .await
      .unwrap();
    assert_eq!(incomplete.len(), 1);
    assert_eq!(incomplete[0].name, "900012345");

    // Re-running the same body inserts nothing new.
    let resp = post_json(router, "/import/save", save_body(rows)).await;
    let body = body_json(resp).await;
    assert_eq!(body["data"]["inserted"], json!(0));
    assert_eq!(body["data"]["skipped"], json!(1));
  }

  #[tokio::test]
  async fn save_rejects_unknown_table_and_upsert_key() {
    let (router, _) = test_router().await;
    let body = json!({
      "table": "users; DROP TABLE clients",
      "rows": [{ "BAN": "900012345" }],
      "mapping": { "ban": "BAN" },
      "upsertKey": "email",
    });

    let resp = post_json(router, "/import/save", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
  }

  #[tokio::test]
  async fn save_requires_a_ban_mapping() {
    let (router, _) = test_router().await;
    let body = json!({
      "table": "accounts",
      "rows": [{ "SUB": "7871234567" }],
      "mapping": { "sub": "SUB" },
    });

    let resp = post_json(router, "/import/save", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Incomplete clients ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn incomplete_listing_paginates() {
    let (router, _store) = test_router().await;

    for n in 0..3 {
      let rows = json!([
        { "BAN": format!("90001234{n}"), "SUB": "", "STATUS": "A",
          "plan": "", "BASE": "", "Razon Social": "" },
      ]);
      post_json(router.clone(), "/import/save", save_body(rows)).await;
    }

    let req = Request::builder()
      .uri("/clients/incomplete?limit=2&offset=0")
      .body(Body::empty())
      .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], json!(3));
    assert_eq!(body["pagination"]["limit"], json!(2));
  }
}
