//! Error types for the banbook-sheet codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported spreadsheet format: {0:?} (use .csv or .xlsx)")]
  UnsupportedFormat(String),

  #[error("workbook has no worksheets")]
  NoWorksheet,

  #[error("sheet contains no rows")]
  EmptySheet,

  #[error(
    "no keyword match for column(s) {fields:?}; refusing positional fallback"
  )]
  PositionalFallback { fields: Vec<&'static str> },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
