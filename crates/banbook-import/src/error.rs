//! Error types for `banbook-import`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sheet error: {0}")]
  Sheet(#[from] banbook_sheet::Error),

  #[error("no header row found and positional fallback is disabled")]
  HeaderNotFound,

  #[error("no BAN for this sheet: neither the metadata block nor --ban")]
  MissingBan,

  #[error("unified sheet has no BAN column")]
  MissingBanColumn,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
