//! Handlers for `/import` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import/upload` | Multipart `file` part; returns detected header + mapping + sample |
//! | `POST` | `/import/save` | Body: `{ table, rows, mapping, upsertKey }` |

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Multipart, State},
};
use banbook_core::store::CrmStore;
use banbook_import::import_unified;
use banbook_sheet::{
  ColumnOrigin, DEFAULT_HEADER_ROW, Sheet, SheetField, locate_header,
  map_columns, read_sheet_bytes,
};
use serde::{Deserialize, Serialize};

use crate::{envelope::Envelope, error::ApiError};

/// Rows of sample data returned by the upload preview.
const SAMPLE_ROWS: usize = 5;

// ─── Upload ───────────────────────────────────────────────────────────────────

/// Provenance of one semantic column, for the mapping UI.
#[derive(Debug, Serialize)]
pub struct ColumnInfo {
  pub field:  &'static str,
  pub index:  usize,
  /// `"keyword"` when a header cell matched, `"positional"` otherwise.
  pub origin: &'static str,
  /// The matched header text, when keyword-matched.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub header: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadData {
  /// Index of the detected header row; `None` when no row matched and the
  /// first row is shown instead.
  pub header_row: Option<usize>,
  pub headers:    Vec<String>,
  pub columns:    Vec<ColumnInfo>,
  /// Up to five non-empty data rows following the header.
  pub sample:     Vec<Vec<String>>,
}

/// `POST /import/upload` — parse the uploaded workbook and return what the
/// import would see, without writing anything.
pub async fn upload(
  mut multipart: Multipart,
) -> Result<Json<Envelope<UploadData>>, ApiError> {
  let mut file: Option<(String, Vec<u8>)> = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    if field.name() == Some("file") {
      let name = field.file_name().unwrap_or("upload").to_string();
      let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
      file = Some((name, bytes.to_vec()));
    }
  }

  let (name, bytes) =
    file.ok_or_else(|| ApiError::BadRequest("missing file part".into()))?;

  let ext = name
    .rsplit_once('.')
    .map(|(_, e)| e.to_ascii_lowercase())
    .ok_or_else(|| {
      ApiError::BadRequest(format!("no file extension on {name:?}"))
    })?;

  let sheet = read_sheet_bytes(&bytes, &ext)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let location = locate_header(&sheet, DEFAULT_HEADER_ROW);
  let header_row = location.row();
  let display_row = header_row.unwrap_or(0);
  let headers = sheet.row(display_row).unwrap_or(&[]).to_vec();

  let map = map_columns(&headers);
  let columns = SheetField::ALL
    .into_iter()
    .map(|field| {
      let mapped = map.get(field);
      let (origin, header) = match &mapped.origin {
        ColumnOrigin::Keyword { header } => ("keyword", Some(header.clone())),
        ColumnOrigin::Positional => ("positional", None),
      };
      ColumnInfo { field: field.name(), index: mapped.index, origin, header }
    })
    .collect();

  let sample: Vec<Vec<String>> = sheet
    .rows()
    .iter()
    .skip(display_row + 1)
    .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
    .take(SAMPLE_ROWS)
    .cloned()
    .collect();

  Ok(Json(Envelope::ok(UploadData {
    header_row,
    headers,
    columns,
    sample,
  })))
}

// ─── Save ─────────────────────────────────────────────────────────────────────

/// Canonical mapping targets, paired with the header cell each one becomes
/// in the synthesized sheet.
const SAVE_TARGETS: [(&str, &str); 10] = [
  ("ban", "BAN"),
  ("sub", "SUB"),
  ("status", "STATUS"),
  ("plan", "plan"),
  ("base", "BASE"),
  ("business_name", "Razon Social"),
  ("email", "Email"),
  ("name", "Nombre"),
  ("address", "Direccion"),
  ("city", "Ciudad"),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBody {
  pub table:      String,
  pub rows:       Vec<serde_json::Map<String, serde_json::Value>>,
  /// Target field → source column key in `rows`.
  pub mapping:    HashMap<String, String>,
  #[serde(default)]
  pub upsert_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveData {
  /// BANs created by this request.
  pub inserted: usize,
  /// BANs skipped because they already existed.
  pub skipped:  usize,
  /// Rows rejected or flagged during normalization.
  pub errors:   usize,
}

/// `POST /import/save` — run the accounts pipeline over caller-mapped rows.
///
/// `table` is a fixed vocabulary, not an SQL identifier; only `"accounts"`
/// (clients → BANs → subscribers) is understood.
pub async fn save<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SaveBody>,
) -> Result<Json<Envelope<SaveData>>, ApiError>
where
  S: CrmStore,
{
  let mut problems = Vec::new();

  if body.table != "accounts" {
    problems.push(format!(
      "unknown table {:?} (expected \"accounts\")",
      body.table
    ));
  }
  if body.rows.is_empty() {
    problems.push("rows must not be empty".to_string());
  }
  if let Some(key) = body.upsert_key.as_deref()
    && key != "ban_number"
    && key != "ban"
  {
    problems.push(format!(
      "unsupported upsert key {key:?} (imports always dedupe on ban_number)"
    ));
  }

  let mut targets: Vec<(&'static str, &'static str, &str)> = Vec::new();
  for (target, source) in &body.mapping {
    match SAVE_TARGETS
      .iter()
      .copied()
      .find(|(t, _)| *t == target.as_str())
    {
      Some((t, header)) => targets.push((t, header, source.as_str())),
      None => problems.push(format!("unknown mapping target {target:?}")),
    }
  }
  if !body.mapping.contains_key("ban") {
    problems.push("mapping must include a \"ban\" target".to_string());
  }

  if !problems.is_empty() {
    return Err(ApiError::Validation(problems));
  }

  // Keep the canonical column order regardless of map iteration order.
  targets.sort_by_key(|(t, _, _)| {
    SAVE_TARGETS.iter().position(|(name, _)| name == t)
  });

  // Synthesize a unified sheet and run the normal pipeline over it.
  let mut rows: Vec<Vec<String>> =
    vec![targets.iter().map(|(_, h, _)| h.to_string()).collect()];
  for record in &body.rows {
    rows.push(
      targets
        .iter()
        .map(|(_, _, source)| {
          record.get(*source).map_or_else(String::new, cell_to_string)
        })
        .collect(),
    );
  }
  let sheet = Sheet::from_rows(rows);

  let report = import_unified(store.as_ref(), &sheet, "api/import/save")
    .await
    .map_err(ApiError::from)?;

  let data = SaveData {
    inserted: report.bans_created,
    skipped:  report.bans_existing + report.rows_dropped,
    errors:   report.diagnostics.len(),
  };

  Ok(Json(Envelope::ok(data).with_message(format!(
    "imported {} accounts, {} subscribers",
    report.bans_created, report.subscribers_created
  ))))
}

fn cell_to_string(value: &serde_json::Value) -> String {
  match value {
    serde_json::Value::Null => String::new(),
    serde_json::Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
