//! Activation-workbook pipeline.
//!
//! An activation workbook describes new lines for a single BAN. A metadata
//! block occupies the rows above the data table:
//!
//! ```text
//! row 2: vendor          (column 3, falling back to column 2)
//! row 4: BAN             (same column fallback)
//! row 6: business name   (same column fallback)
//! row 9: header row      (usual position; located by keyword regardless)
//! ```
//!
//! Data rows below the header are normalized one by one; rows whose phone
//! fails validation are dropped and counted, never raised.

use banbook_core::{
  ban::AccountStatus,
  import::{NewAccount, NewSubscriber},
  store::CrmStore,
};
use banbook_sheet::{
  ColumnMap, DEFAULT_HEADER_ROW, HeaderLocation, NormalizedRow, Sheet,
  SheetField, locate_header, map_columns, normalize_ban, normalize_row,
};
use chrono::NaiveDate;

use crate::{
  Error, Result,
  reconcile::merge_duplicate_clients,
  report::{Diagnostic, ImportReport},
};

// Metadata block positions.
const VENDOR_ROW: usize = 2;
const BAN_ROW: usize = 4;
const BUSINESS_ROW: usize = 6;
const META_COL: usize = 3;
const META_FALLBACK_COL: usize = 2;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Knobs for [`parse_activation_sheet`].
#[derive(Debug, Clone)]
pub struct ActivationOptions {
  /// Accept positional column defaults when keywords fail to match.
  /// Off by default: column drift then becomes an error, not bad data.
  pub allow_positional: bool,
  /// BAN supplied by the operator, for sheets without a metadata block.
  pub ban_override:     Option<String>,
  /// Import date used to compute contract end dates.
  pub today:            NaiveDate,
}

impl ActivationOptions {
  pub fn new(today: NaiveDate) -> Self {
    Self { allow_positional: false, ban_override: None, today }
  }
}

// ─── Parse result ────────────────────────────────────────────────────────────

/// A fully parsed activation workbook, ready to persist or preview.
#[derive(Debug)]
pub struct ActivationSheet {
  pub vendor:        String,
  pub ban_number:    Option<String>,
  pub business_name: String,
  pub header:        HeaderLocation,
  pub columns:       ColumnMap,
  pub rows:          Vec<NormalizedRow>,
  pub rows_dropped:  usize,
  pub diagnostics:   Vec<Diagnostic>,
}

impl ActivationSheet {
  /// Build the persistence batch: one account, one subscriber per accepted
  /// row. Activations are new lines, so everything is written as active.
  pub fn to_account(&self) -> Result<NewAccount> {
    let ban_number =
      self.ban_number.clone().ok_or(Error::MissingBan)?;

    let subscribers = self
      .rows
      .iter()
      .map(|row| NewSubscriber {
        phone:         row.phone.clone(),
        status:        AccountStatus::Active,
        plan:          non_empty(&row.plan),
        base:          None,
        monthly_value: row.monthly_value,
        contract_end:  row.contract_end,
        notes:         non_empty(&row.notes),
      })
      .collect();

    Ok(NewAccount {
      ban_number,
      status: AccountStatus::Active,
      business_name: non_empty(&self.business_name),
      email: None,
      address: None,
      city: None,
      subscribers,
    })
  }
}

fn non_empty(s: &str) -> Option<String> {
  let trimmed = s.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

/// Metadata cells live in column 3 but drift to column 2 in older files.
fn meta_cell(sheet: &Sheet, row: usize) -> String {
  let primary = sheet.cell(row, META_COL).trim();
  if !primary.is_empty() {
    return primary.to_string();
  }
  sheet.cell(row, META_FALLBACK_COL).trim().to_string()
}

// ─── Parse ───────────────────────────────────────────────────────────────────

/// Run the full heuristic over `sheet`: metadata extraction, header
/// location, column mapping, and row normalization.
pub fn parse_activation_sheet(
  sheet: &Sheet,
  opts: &ActivationOptions,
) -> Result<ActivationSheet> {
  let mut diagnostics = Vec::new();

  // Metadata block.
  let vendor = meta_cell(sheet, VENDOR_ROW);
  let business_name = meta_cell(sheet, BUSINESS_ROW);
  let ban_number = match &opts.ban_override {
    Some(ban) => normalize_ban(ban),
    None => normalize_ban(&meta_cell(sheet, BAN_ROW)),
  };

  if vendor.is_empty() {
    diagnostics.push(Diagnostic::sheet("vendor not found in metadata block"));
  }
  if ban_number.is_none() {
    diagnostics.push(Diagnostic::sheet("BAN not found in metadata block"));
  }
  if business_name.is_empty() {
    diagnostics
      .push(Diagnostic::sheet("business name not found in metadata block"));
  }

  // Header row.
  let header = locate_header(sheet, DEFAULT_HEADER_ROW);
  let header_row = match header.row() {
    Some(row) => row,
    None if opts.allow_positional => {
      diagnostics.push(Diagnostic::sheet(
        "no header row found; assuming the default layout",
      ));
      DEFAULT_HEADER_ROW
    }
    None => return Err(Error::HeaderNotFound),
  };

  // Column mapping.
  let header_cells = sheet.row(header_row).unwrap_or(&[]);
  let columns = map_columns(header_cells);
  if opts.allow_positional {
    for field in columns.positional_fields() {
      tracing::warn!(
        field = field.name(),
        column = columns.index(field),
        "no keyword match; using positional default"
      );
    }
  } else {
    columns.require_keyword_matches()?;
  }

  // Data rows.
  let mut rows = Vec::new();
  let mut rows_dropped = 0usize;

  for (offset, cells) in
    sheet.rows().iter().skip(header_row + 1).enumerate()
  {
    if cells.iter().all(|c| c.trim().is_empty()) {
      continue;
    }
    let row_number = offset + 1;

    match normalize_row(cells, &columns, opts.today) {
      Some(row) => {
        if row.plan.is_empty() {
          diagnostics.push(Diagnostic::row(row_number, "plan is required"));
        }
        if row.monthly_value.is_none() {
          diagnostics
            .push(Diagnostic::row(row_number, "monthly value is required"));
        }
        rows.push(row);
      }
      None => {
        rows_dropped += 1;
        let raw_phone = cells
          .get(columns.index(SheetField::Phone))
          .map_or("", String::as_str);
        diagnostics.push(Diagnostic::row(
          row_number,
          format!("invalid phone: {raw_phone:?}"),
        ));
      }
    }
  }

  Ok(ActivationSheet {
    vendor,
    ban_number,
    business_name,
    header,
    columns,
    rows,
    rows_dropped,
    diagnostics,
  })
}

// ─── Persist ─────────────────────────────────────────────────────────────────

/// Parse `sheet`, write the batch, and reconcile duplicate clients.
pub async fn import_activation<S: CrmStore>(
  store: &S,
  sheet: &Sheet,
  opts: &ActivationOptions,
  source: &str,
) -> Result<ImportReport> {
  let parsed = parse_activation_sheet(sheet, opts)?;
  let account = parsed.to_account()?;

  tracing::info!(
    source,
    ban = %account.ban_number,
    subscribers = account.subscribers.len(),
    "importing activation sheet"
  );

  let stats = store
    .import_accounts(vec![account])
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let merge = merge_duplicate_clients(store).await?;

  Ok(ImportReport {
    source:              source.to_string(),
    clients_created:     stats.clients_created,
    bans_created:        stats.bans_created,
    subscribers_created: stats.subscribers_created,
    bans_existing:       stats.bans_existing,
    rows_dropped:        parsed.rows_dropped,
    clients_merged:      merge.clients_merged,
    bans_moved:          merge.bans_moved,
    diagnostics:         parsed.diagnostics,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn sheet(rows: Vec<Vec<&str>>) -> Sheet {
    Sheet::from_rows(
      rows
        .into_iter()
        .map(|r| r.into_iter().map(str::to_string).collect())
        .collect(),
    )
  }

  /// A miniature activation workbook in the canonical layout.
  fn activation_sheet() -> Sheet {
    let mut rows: Vec<Vec<&str>> = vec![
      vec!["TABLA DE ACTIVACIONES"],
      vec![],
      vec!["", "", "VENDEDOR:", "H. Rivera"],
      vec![],
      vec!["", "", "BAN:", "900-012-345"],
      vec![],
      vec!["", "", "CLIENTE:", "Acme Corp"],
      vec![],
      vec![],
    ];
    rows.push(vec!["#", "CELULAR", "PLAN", "VALOR", "MESES", "NOTAS"]);
    rows.push(vec!["1", "(787) 555-0001", "Business 5GB", "39,99", "24", ""]);
    rows.push(vec!["2", "787-555-0002", "Business 10GB", "45.50", "12", "porta"]);
    rows.push(vec!["3", "555-01", "Broken", "10", "1", ""]);
    sheet(rows)
  }

  fn opts() -> ActivationOptions {
    ActivationOptions::new(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
  }

  #[test]
  fn parses_metadata_and_rows() {
    let parsed = parse_activation_sheet(&activation_sheet(), &opts()).unwrap();

    assert_eq!(parsed.vendor, "H. Rivera");
    assert_eq!(parsed.ban_number.as_deref(), Some("900012345"));
    assert_eq!(parsed.business_name, "Acme Corp");
    assert_eq!(parsed.header, HeaderLocation::Default(9));

    assert_eq!(parsed.rows.len(), 2);
    assert_eq!(parsed.rows[0].phone, "7875550001");
    assert_eq!(parsed.rows[0].monthly_value, Some(39.99));
    assert_eq!(
      parsed.rows[0].contract_end,
      NaiveDate::from_ymd_opt(2028, 1, 15)
    );
    assert_eq!(parsed.rows_dropped, 1);
  }

  #[test]
  fn metadata_falls_back_to_column_two() {
    let mut rows: Vec<Vec<&str>> = vec![
      vec![],
      vec![],
      vec!["", "", "H. Rivera"],
      vec![],
      vec!["", "", "900012345"],
      vec![],
      vec!["", "", "Acme Corp"],
    ];
    rows.push(vec!["CELULAR", "PLAN", "VALOR", "MESES", "NOTAS"]);
    rows.push(vec!["7875550001", "X", "10", "0", ""]);
    let parsed = parse_activation_sheet(&sheet(rows), &opts()).unwrap();

    assert_eq!(parsed.vendor, "H. Rivera");
    assert_eq!(parsed.ban_number.as_deref(), Some("900012345"));
    assert_eq!(parsed.header, HeaderLocation::Scanned(7));
  }

  #[test]
  fn strict_mode_rejects_headerless_sheet() {
    let rows = vec![vec!["no", "keywords", "here"]];
    let err = parse_activation_sheet(&sheet(rows), &opts()).unwrap_err();
    assert!(matches!(err, Error::HeaderNotFound));
  }

  #[test]
  fn lenient_mode_accepts_headerless_sheet() {
    let mut o = opts();
    o.allow_positional = true;
    o.ban_override = Some("900012345".to_string());

    let mut rows: Vec<Vec<&str>> = vec![vec![]; 10];
    // Positional layout: phone in column 0.
    rows.push(vec!["7875550001"]);
    let parsed = parse_activation_sheet(&sheet(rows), &o).unwrap();

    assert_eq!(parsed.header, HeaderLocation::NotFound);
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].phone, "7875550001");
  }

  #[test]
  fn ban_override_beats_metadata_block() {
    let mut o = opts();
    o.ban_override = Some("111-222-333".to_string());
    let parsed = parse_activation_sheet(&activation_sheet(), &o).unwrap();
    assert_eq!(parsed.ban_number.as_deref(), Some("111222333"));
  }

  #[test]
  fn to_account_requires_a_ban() {
    let rows = vec![
      vec![],
      vec![],
      vec![],
      vec![],
      vec![],
      vec![],
      vec![],
      vec![],
      vec![],
      vec!["CELULAR", "PLAN", "VALOR", "MESES", "NOTAS"],
    ];
    let parsed = parse_activation_sheet(&sheet(rows), &opts()).unwrap();
    assert!(matches!(parsed.to_account(), Err(Error::MissingBan)));
  }

  #[test]
  fn to_account_marks_everything_active() {
    let parsed = parse_activation_sheet(&activation_sheet(), &opts()).unwrap();
    let account = parsed.to_account().unwrap();

    assert_eq!(account.ban_number, "900012345");
    assert_eq!(account.status, AccountStatus::Active);
    assert_eq!(account.business_name.as_deref(), Some("Acme Corp"));
    assert_eq!(account.subscribers.len(), 2);
    assert!(
      account
        .subscribers
        .iter()
        .all(|s| s.status == AccountStatus::Active)
    );
    assert_eq!(account.subscribers[1].notes.as_deref(), Some("porta"));
  }
}
