//! Unified-customer-sheet pipeline.
//!
//! A unified sheet lists every BAN and subscriber line in one table with a
//! named header row at the top: BAN, SUB, STATUS, plan, BASE, Razon Social,
//! Email (plus optional Nombre/Direccion/Ciudad). Rows are grouped by BAN;
//! the first row of a group supplies the account-level fields.

use std::collections::HashMap;

use banbook_core::{
  ban::AccountStatus,
  import::{NewAccount, NewSubscriber},
  store::CrmStore,
};
use banbook_sheet::Sheet;

use crate::{
  Error, Result,
  reconcile::merge_duplicate_clients,
  report::{Diagnostic, ImportReport},
};

/// A unified-sheet BAN must be exactly this many digits.
const UNIFIED_BAN_DIGITS: usize = 9;
/// A unified-sheet subscriber number must be exactly this many digits.
const UNIFIED_SUB_DIGITS: usize = 10;

// ─── Column lookup ───────────────────────────────────────────────────────────

/// Indices of the unified sheet's named columns, located case-insensitively.
#[derive(Debug, Default)]
struct UnifiedColumns {
  ban:      Option<usize>,
  sub:      Option<usize>,
  status:   Option<usize>,
  plan:     Option<usize>,
  base:     Option<usize>,
  business: Option<usize>,
  email:    Option<usize>,
  name:     Option<usize>,
  address:  Option<usize>,
  city:     Option<usize>,
}

fn locate_unified_columns(headers: &[String]) -> UnifiedColumns {
  let find = |pred: &dyn Fn(&str) -> bool| {
    headers
      .iter()
      .position(|h| pred(&h.to_lowercase()))
  };

  UnifiedColumns {
    ban:      find(&|h| h.contains("ban")),
    sub:      find(&|h| {
      h == "sub"
        || h.contains("telefono")
        || h.contains("celular")
        || h.contains("movil")
    }),
    status:   find(&|h| h.contains("status") || h.contains("estado")),
    plan:     find(&|h| h.contains("plan")),
    base:     find(&|h| h.contains("base")),
    business: find(&|h| h.contains("razon social")),
    email:    find(&|h| h.contains("email") || h.contains("correo")),
    name:     find(&|h| h.contains("nombre")),
    address:  find(&|h| h.contains("direccion")),
    city:     find(&|h| h.contains("ciudad")),
  }
}

fn cell<'a>(cells: &'a [String], idx: Option<usize>) -> &'a str {
  idx.and_then(|i| cells.get(i)).map_or("", |s| s.trim())
}

fn non_empty(s: &str) -> Option<String> {
  if s.is_empty() { None } else { Some(s.to_string()) }
}

fn exact_digits(raw: &str, len: usize) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.len() == len && trimmed.chars().all(|c| c.is_ascii_digit()) {
    Some(trimmed.to_string())
  } else {
    None
  }
}

// ─── Parse ───────────────────────────────────────────────────────────────────

/// The grouped result of parsing a unified sheet.
#[derive(Debug)]
pub struct UnifiedParse {
  pub accounts:     Vec<NewAccount>,
  /// Data rows ignored for lack of a valid 9-digit BAN.
  pub rows_skipped: usize,
  pub diagnostics:  Vec<Diagnostic>,
}

/// Group the sheet's data rows by BAN. Row 0 must be the named header row.
pub fn parse_unified_sheet(sheet: &Sheet) -> Result<UnifiedParse> {
  let headers = sheet.row(0).ok_or(Error::MissingBanColumn)?;
  let columns = locate_unified_columns(headers);
  let ban_col = columns.ban.ok_or(Error::MissingBanColumn)?;

  let mut accounts: Vec<NewAccount> = Vec::new();
  let mut index_by_ban: HashMap<String, usize> = HashMap::new();
  let mut rows_skipped = 0usize;
  let mut diagnostics = Vec::new();

  for (offset, cells) in sheet.rows().iter().skip(1).enumerate() {
    if cells.iter().all(|c| c.trim().is_empty()) {
      continue;
    }
    let row_number = offset + 1;

    let raw_ban = cells.get(ban_col).map_or("", |s| s.trim());
    let Some(ban) = exact_digits(raw_ban, UNIFIED_BAN_DIGITS) else {
      rows_skipped += 1;
      if !raw_ban.is_empty() {
        diagnostics.push(Diagnostic::row(
          row_number,
          format!("not a {UNIFIED_BAN_DIGITS}-digit BAN: {raw_ban:?}"),
        ));
      }
      continue;
    };

    let status =
      AccountStatus::from_source_code(cell(cells, columns.status));

    // First row of a group supplies the account-level fields.
    let idx = *index_by_ban.entry(ban.clone()).or_insert_with(|| {
      let business = non_empty(cell(cells, columns.business))
        .or_else(|| non_empty(cell(cells, columns.name)));
      accounts.push(NewAccount {
        ban_number:    ban.clone(),
        status,
        business_name: business,
        email:         non_empty(cell(cells, columns.email)),
        address:       non_empty(cell(cells, columns.address)),
        city:          non_empty(cell(cells, columns.city)),
        subscribers:   Vec::new(),
      });
      accounts.len() - 1
    });

    let raw_sub = cell(cells, columns.sub);
    if let Some(phone) = exact_digits(raw_sub, UNIFIED_SUB_DIGITS) {
      accounts[idx].subscribers.push(NewSubscriber {
        phone,
        status,
        plan: non_empty(cell(cells, columns.plan)),
        base: non_empty(cell(cells, columns.base)),
        monthly_value: None,
        contract_end: None,
        notes: None,
      });
    } else if !raw_sub.is_empty() {
      diagnostics.push(Diagnostic::row(
        row_number,
        format!("not a {UNIFIED_SUB_DIGITS}-digit subscriber: {raw_sub:?}"),
      ));
    }
  }

  Ok(UnifiedParse { accounts, rows_skipped, diagnostics })
}

// ─── Persist ─────────────────────────────────────────────────────────────────

/// Parse `sheet`, write the batch, and reconcile duplicate clients.
pub async fn import_unified<S: CrmStore>(
  store: &S,
  sheet: &Sheet,
  source: &str,
) -> Result<ImportReport> {
  let parsed = parse_unified_sheet(sheet)?;

  tracing::info!(
    source,
    accounts = parsed.accounts.len(),
    skipped = parsed.rows_skipped,
    "importing unified sheet"
  );

  let stats = store
    .import_accounts(parsed.accounts)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let merge = merge_duplicate_clients(store).await?;

  Ok(ImportReport {
    source:              source.to_string(),
    clients_created:     stats.clients_created,
    bans_created:        stats.bans_created,
    subscribers_created: stats.subscribers_created,
    bans_existing:       stats.bans_existing,
    rows_dropped:        parsed.rows_skipped,
    clients_merged:      merge.clients_merged,
    bans_moved:          merge.bans_moved,
    diagnostics:         parsed.diagnostics,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
