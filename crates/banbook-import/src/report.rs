//! Import report — the row-level outcome of one import run.
//!
//! Validation problems are collected as data, never thrown; a batch with
//! diagnostics still imports its accepted rows.

use serde::Serialize;

/// A non-fatal problem found while parsing or validating a sheet.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
  /// 1-based data-row number within the sheet, when the problem is
  /// row-scoped.
  pub row:     Option<usize>,
  pub message: String,
}

impl Diagnostic {
  pub fn sheet(message: impl Into<String>) -> Self {
    Self { row: None, message: message.into() }
  }

  pub fn row(row: usize, message: impl Into<String>) -> Self {
    Self { row: Some(row), message: message.into() }
  }
}

/// Everything the caller needs to know about one import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
  /// Human-readable name of the source (usually the file name).
  pub source:              String,
  pub clients_created:     usize,
  pub bans_created:        usize,
  pub subscribers_created: usize,
  /// BANs skipped because their number already existed in the store.
  pub bans_existing:       usize,
  /// Data rows dropped during normalization (e.g. short phones).
  pub rows_dropped:        usize,
  /// Duplicate clients absorbed by the reconciliation pass.
  pub clients_merged:      usize,
  /// BANs reattached by the reconciliation pass.
  pub bans_moved:          usize,
  pub diagnostics:         Vec<Diagnostic>,
}

impl ImportReport {
  pub fn has_diagnostics(&self) -> bool { !self.diagnostics.is_empty() }
}
