//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Validation problems come back as 400 with a message array; unclassified
//! store failures are logged server-side and answered with a generic 500.
//! Error responses use the same envelope shape as success responses.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::Envelope;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed")]
  Validation(Vec<String>),

  #[error("import error: {0}")]
  Import(banbook_import::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<banbook_import::Error> for ApiError {
  fn from(e: banbook_import::Error) -> Self {
    match e {
      // Storage failures are server faults; everything else is bad input.
      banbook_import::Error::Store(inner) => ApiError::Store(inner),
      other => ApiError::Import(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message, errors) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m, None),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m, None),
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        "validation failed".to_string(),
        Some(errors),
      ),
      ApiError::Import(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_string(),
          None,
        )
      }
    };

    let body = Envelope::<serde_json::Value> {
      success:    false,
      data:       None,
      message:    Some(message),
      errors,
      pagination: None,
    };
    (status, Json(body)).into_response()
  }
}
