//! Import pipelines for banbook.
//!
//! Two sheet layouts are understood:
//!
//! - **Activation workbooks** ([`activation`]): one BAN per file, metadata in
//!   fixed cells above the data table, one subscriber line per data row.
//! - **Unified customer sheets** ([`unified`]): many BANs per file, one named
//!   header row, rows grouped by BAN.
//!
//! Both produce [`banbook_core::import::NewAccount`] batches, persist them
//! through any [`banbook_core::store::CrmStore`], then run the duplicate
//! client reconciliation pass ([`reconcile`]) so name collisions never
//! outlive an import run.

pub mod activation;
pub mod error;
pub mod reconcile;
pub mod report;
pub mod unified;

pub use activation::{
  ActivationOptions, ActivationSheet, import_activation,
  parse_activation_sheet,
};
pub use error::{Error, Result};
pub use reconcile::{MergeReport, merge_duplicate_clients};
pub use report::{Diagnostic, ImportReport};
pub use unified::{UnifiedParse, import_unified, parse_unified_sheet};
