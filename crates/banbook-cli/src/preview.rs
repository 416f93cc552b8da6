//! Plain-text previews for `--dry-run` and the verify report.

use banbook_core::store::TableCounts;
use banbook_import::{ActivationSheet, Diagnostic, UnifiedParse};

fn truncate(s: &str, width: usize) -> String {
  s.chars().take(width).collect()
}

/// Render the activation preview table: what would be imported, row by row.
pub fn print_activation(parsed: &ActivationSheet) {
  println!("vendor:   {}", parsed.vendor);
  println!(
    "BAN:      {}",
    parsed.ban_number.as_deref().unwrap_or("(missing)")
  );
  println!("business: {}", parsed.business_name);
  println!();

  println!(
    "{:<4} | {:<12} | {:<20} | {:>8} | {:>6} | {:<12} | {:<20}",
    "#", "PHONE", "PLAN", "VALUE", "MONTHS", "CONTRACT END", "NOTES"
  );
  println!("{}", "-".repeat(92));

  for (idx, row) in parsed.rows.iter().enumerate() {
    let value = row
      .monthly_value
      .map_or_else(String::new, |v| format!("{v:.2}"));
    let end = row
      .contract_end
      .map_or_else(String::new, |d| d.to_string());
    println!(
      "{:<4} | {:<12} | {:<20} | {:>8} | {:>6} | {:<12} | {:<20}",
      idx + 1,
      row.phone,
      truncate(&row.plan, 20),
      value,
      row.months,
      end,
      truncate(&row.notes, 20),
    );
  }

  println!("{}", "-".repeat(92));
  println!(
    "{} rows ready, {} dropped",
    parsed.rows.len(),
    parsed.rows_dropped
  );
  print_diagnostics(&parsed.diagnostics);
}

/// Render the unified-sheet preview: accounts grouped, nothing written.
pub fn print_unified(parsed: &UnifiedParse) {
  let subscribers: usize =
    parsed.accounts.iter().map(|a| a.subscribers.len()).sum();
  let incomplete = parsed
    .accounts
    .iter()
    .filter(|a| a.business_name.is_none())
    .count();

  println!("accounts:    {}", parsed.accounts.len());
  println!("subscribers: {subscribers}");
  println!("incomplete:  {incomplete} (no business name)");
  println!("skipped:     {} rows without a valid BAN", parsed.rows_skipped);
  print_diagnostics(&parsed.diagnostics);
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
  if diagnostics.is_empty() {
    return;
  }
  println!();
  println!("{} problem(s):", diagnostics.len());
  for d in diagnostics {
    match d.row {
      Some(row) => println!("  row {row}: {}", d.message),
      None => println!("  {}", d.message),
    }
  }
}

/// Render the verify report's count table.
pub fn print_counts(counts: &TableCounts) {
  println!(
    "clients:     {} ({} incomplete)",
    counts.clients, counts.incomplete_clients
  );
  println!(
    "bans:        {} ({} active, {} cancelled)",
    counts.bans, counts.bans_active, counts.bans_cancelled
  );
  println!(
    "subscribers: {} ({} active, {} cancelled)",
    counts.subscribers, counts.subscribers_active,
    counts.subscribers_cancelled
  );
}
