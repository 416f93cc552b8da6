//! The uniform response envelope: `{ success, data, message, errors?,
//! pagination? }`. Every endpoint — including error paths — answers in this
//! shape.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
  pub success:    bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:       Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub errors:     Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pagination {
  pub total:  u64,
  pub limit:  usize,
  pub offset: usize,
}

impl<T: Serialize> Envelope<T> {
  pub fn ok(data: T) -> Self {
    Self {
      success:    true,
      data:       Some(data),
      message:    None,
      errors:     None,
      pagination: None,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn with_pagination(mut self, pagination: Pagination) -> Self {
    self.pagination = Some(pagination);
    self
  }
}
