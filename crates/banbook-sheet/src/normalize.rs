//! Cell normalizers and the row normalizer.
//!
//! Phones keep their last 10 digits and must retain at least 8 to be
//! accepted. BANs keep their first 9 digits. Prices tolerate a comma
//! decimal separator. A months count > 0 produces a contract end date by
//! adding that many calendar months to the import date.

use chrono::{Months, NaiveDate};

use crate::map::{ColumnMap, SheetField};

/// Minimum digits a phone must retain after stripping to be accepted.
pub const MIN_PHONE_DIGITS: usize = 8;
/// Phones are truncated to their last this-many digits.
pub const MAX_PHONE_DIGITS: usize = 10;
/// BANs are truncated to their first this-many digits.
pub const BAN_DIGITS: usize = 9;

// ─── Cell normalizers ────────────────────────────────────────────────────────

/// Strip every non-digit character.
pub fn digits_only(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize a phone cell: digits only, last [`MAX_PHONE_DIGITS`] kept.
/// Returns `None` when fewer than [`MIN_PHONE_DIGITS`] digits remain.
pub fn normalize_phone(raw: &str) -> Option<String> {
  let digits = digits_only(raw);
  if digits.len() < MIN_PHONE_DIGITS {
    return None;
  }
  let start = digits.len().saturating_sub(MAX_PHONE_DIGITS);
  Some(digits[start..].to_string())
}

/// Normalize a BAN cell: digits only, first [`BAN_DIGITS`] kept.
/// Returns `None` when no digits remain.
pub fn normalize_ban(raw: &str) -> Option<String> {
  let digits = digits_only(raw.trim());
  if digits.is_empty() {
    return None;
  }
  Some(digits.chars().take(BAN_DIGITS).collect())
}

/// Parse a monetary cell. Comma decimal separators are converted to
/// periods; currency symbols and whitespace are dropped.
pub fn parse_money(raw: &str) -> Option<f64> {
  let cleaned: String = raw
    .trim()
    .replace(',', ".")
    .chars()
    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
    .collect();
  if cleaned.is_empty() {
    return None;
  }
  cleaned.parse().ok()
}

/// Parse a contract-months cell as a digits-only integer; garbage reads as 0.
pub fn parse_months(raw: &str) -> u32 {
  digits_only(raw).parse().unwrap_or(0)
}

/// Contract end date: `today` plus `months` calendar months. A zero count
/// means no contract term.
pub fn contract_end_from_months(
  today: NaiveDate,
  months: u32,
) -> Option<NaiveDate> {
  if months == 0 {
    return None;
  }
  today.checked_add_months(Months::new(months))
}

// ─── Row normalizer ──────────────────────────────────────────────────────────

/// One accepted data row of an activation sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
  pub phone:         String,
  pub plan:          String,
  pub monthly_value: Option<f64>,
  pub months:        u32,
  pub contract_end:  Option<NaiveDate>,
  pub notes:         String,
}

/// Normalize one data row against `map`. Returns `None` when the phone cell
/// fails validation — the caller counts the drop, nothing is raised.
pub fn normalize_row(
  cells: &[String],
  map: &ColumnMap,
  today: NaiveDate,
) -> Option<NormalizedRow> {
  let cell =
    |field: SheetField| cells.get(map.index(field)).map_or("", String::as_str);

  let phone = normalize_phone(cell(SheetField::Phone))?;
  let months = parse_months(cell(SheetField::Months));

  Some(NormalizedRow {
    phone,
    plan: cell(SheetField::Plan).trim().to_string(),
    monthly_value: parse_money(cell(SheetField::Price)),
    months,
    contract_end: contract_end_from_months(today, months),
    notes: cell(SheetField::Notes).trim().to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::map_columns;

  #[test]
  fn phone_strips_and_keeps_last_ten() {
    assert_eq!(
      normalize_phone("+1 (787) 555-0001"),
      Some("7875550001".to_string())
    );
    assert_eq!(
      normalize_phone("001-787-555-0001"),
      Some("7875550001".to_string())
    );
  }

  #[test]
  fn phone_output_is_digits_only_and_at_most_ten() {
    for raw in ["787.555.0001 ext 9", "+521234567890123", "80912345"] {
      let phone = normalize_phone(raw).unwrap();
      assert!(phone.len() <= MAX_PHONE_DIGITS);
      assert!(phone.chars().all(|c| c.is_ascii_digit()));
    }
  }

  #[test]
  fn seven_digits_rejected_eight_accepted() {
    assert_eq!(normalize_phone("123-4567"), None);
    assert_eq!(normalize_phone("1234-5678"), Some("12345678".to_string()));
  }

  #[test]
  fn ban_keeps_first_nine_digits() {
    assert_eq!(normalize_ban(" 900-012-345-99 "), Some("900012345".into()));
    assert_eq!(normalize_ban("BAN"), None);
    assert_eq!(normalize_ban(""), None);
  }

  #[test]
  fn money_accepts_comma_decimal_separator() {
    assert_eq!(parse_money("39,99"), Some(39.99));
    assert_eq!(parse_money("$ 45.50"), Some(45.5));
    assert_eq!(parse_money(""), None);
    assert_eq!(parse_money("N/A"), None);
  }

  #[test]
  fn months_parse_ignores_noise() {
    assert_eq!(parse_months("24 meses"), 24);
    assert_eq!(parse_months(""), 0);
    assert_eq!(parse_months("n/a"), 0);
  }

  #[test]
  fn contract_end_adds_calendar_months() {
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    assert_eq!(
      contract_end_from_months(today, 24),
      NaiveDate::from_ymd_opt(2028, 1, 15)
    );
    assert_eq!(contract_end_from_months(today, 0), None);
  }

  #[test]
  fn row_with_short_phone_is_dropped() {
    let headers: Vec<String> =
      ["CELULAR", "PLAN", "VALOR", "MESES", "NOTAS"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let map = map_columns(&headers);
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

    let cells: Vec<String> = ["555-0001", "X", "10", "12", ""]
      .iter()
      .map(|s| s.to_string())
      .collect();
    assert_eq!(normalize_row(&cells, &map, today), None);
  }

  #[test]
  fn row_normalizes_every_field() {
    let headers: Vec<String> =
      ["CELULAR", "PLAN", "VALOR", "MESES", "NOTAS"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let map = map_columns(&headers);
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

    let cells: Vec<String> =
      ["(787) 555-0001", " Business 5GB ", "39,99", "24", " porta "]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let row = normalize_row(&cells, &map, today).unwrap();
    assert_eq!(row.phone, "7875550001");
    assert_eq!(row.plan, "Business 5GB");
    assert_eq!(row.monthly_value, Some(39.99));
    assert_eq!(row.months, 24);
    assert_eq!(row.contract_end, NaiveDate::from_ymd_opt(2028, 1, 15));
    assert_eq!(row.notes, "porta");
  }
}
