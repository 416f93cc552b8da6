//! Header locator.
//!
//! Source workbooks carry a metadata block above the data table, so the
//! header row is usually — but not always — row index 9. A row qualifies as
//! the header if any cell contains a phone-column keyword.

use crate::Sheet;

/// Row index checked first (the 10th row of the sheet).
pub const DEFAULT_HEADER_ROW: usize = 9;

const PHONE_KEYWORDS: [&str; 3] = ["CELULAR", "TELEFONO", "PHONE"];

/// Where (and whether) the header row was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLocation {
  /// The default row contained a phone keyword.
  Default(usize),
  /// Found by scanning from the top of the sheet.
  Scanned(usize),
  /// No row contains a phone keyword. The caller decides whether to fall
  /// back to positional column defaults.
  NotFound,
}

impl HeaderLocation {
  pub fn row(&self) -> Option<usize> {
    match *self {
      HeaderLocation::Default(r) | HeaderLocation::Scanned(r) => Some(r),
      HeaderLocation::NotFound => None,
    }
  }
}

/// Find the most likely header row: the default row if it contains a phone
/// keyword, otherwise the first matching row from the top.
pub fn locate_header(sheet: &Sheet, default_row: usize) -> HeaderLocation {
  if let Some(cells) = sheet.row(default_row)
    && has_phone_keyword(cells)
  {
    return HeaderLocation::Default(default_row);
  }

  for (idx, cells) in sheet.rows().iter().enumerate() {
    if has_phone_keyword(cells) {
      return HeaderLocation::Scanned(idx);
    }
  }

  HeaderLocation::NotFound
}

fn has_phone_keyword(cells: &[String]) -> bool {
  cells.iter().any(|cell| {
    let upper = cell.to_uppercase();
    PHONE_KEYWORDS.iter().any(|kw| upper.contains(kw))
  })
}
