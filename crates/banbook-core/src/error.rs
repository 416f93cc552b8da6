//! Error types for `banbook-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("client not found: {0}")]
  ClientNotFound(Uuid),

  #[error("ban not found: {0}")]
  BanNotFound(String),

  #[error("ban {0} already exists")]
  DuplicateBan(String),

  #[error("cannot merge a client into itself")]
  SelfMerge,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
