//! Handlers for `/clients` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/clients/incomplete` | Paginated: `?limit=<n>&offset=<n>` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use banbook_core::{
  client::Client,
  store::{ClientQuery, CrmStore},
};
use serde::Deserialize;

use crate::{
  envelope::{Envelope, Pagination},
  error::ApiError,
};

const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /clients/incomplete` — clients lacking a business name, oldest
/// first, for manual completion.
pub async fn incomplete<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Envelope<Vec<Client>>>, ApiError>
where
  S: CrmStore,
{
  let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
  let offset = params.offset.unwrap_or(0);

  let query = ClientQuery {
    incomplete_only: true,
    limit:           Some(limit),
    offset:          Some(offset),
  };

  let clients = store
    .list_clients(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let total = store
    .count_clients(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(
    Envelope::ok(clients)
      .with_pagination(Pagination { total, limit, offset }),
  ))
}
