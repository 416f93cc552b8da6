//! Workbook readers: CSV via the `csv` crate, XLSX/XLS via `calamine`.
//!
//! Only the first worksheet of a workbook is read. Cells are rendered to
//! trimmed strings; the grid is padded with the worksheet's start offset so
//! row/column indices stay absolute regardless of where the used range
//! begins.

use std::{io::Cursor, path::Path};

use calamine::Reader as _;

use crate::{Error, Result, Sheet};

/// Read the first sheet of `path`, choosing the parser by file extension.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
  let ext = path
    .extension()
    .map(|e| e.to_string_lossy().to_ascii_lowercase())
    .unwrap_or_default();
  let bytes = std::fs::read(path)?;
  read_sheet_bytes(&bytes, &ext)
}

/// Read the first sheet from an in-memory file (e.g. an HTTP upload).
/// `ext` is the lowercase file extension without the dot.
pub fn read_sheet_bytes(bytes: &[u8], ext: &str) -> Result<Sheet> {
  match ext {
    "csv" => read_csv(bytes),
    "xlsx" | "xls" => read_workbook(bytes),
    other => Err(Error::UnsupportedFormat(other.to_string())),
  }
}

fn read_csv(bytes: &[u8]) -> Result<Sheet> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .from_reader(bytes);

  let mut rows = Vec::new();
  for record in reader.records() {
    let record = record?;
    rows.push(record.iter().map(|c| c.trim().to_string()).collect());
  }
  if rows.is_empty() {
    return Err(Error::EmptySheet);
  }
  Ok(Sheet::from_rows(rows))
}

fn read_workbook(bytes: &[u8]) -> Result<Sheet> {
  let mut workbook =
    calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or(Error::NoWorksheet)??;

  // The used range may not start at A1; pad so indices are absolute.
  let (start_row, start_col) = range.start().unwrap_or((0, 0));
  let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];

  for cells in range.rows() {
    let mut row = vec![String::new(); start_col as usize];
    row.extend(cells.iter().map(|c| c.to_string().trim().to_string()));
    rows.push(row);
  }

  if rows.is_empty() {
    return Err(Error::EmptySheet);
  }
  Ok(Sheet::from_rows(rows))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn csv_bytes_parse_into_a_grid() {
    let csv = b"BAN,SUB,STATUS\n900012345,7871234567,A\n";
    let sheet = read_sheet_bytes(csv, "csv").unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.cell(0, 0), "BAN");
    assert_eq!(sheet.cell(1, 1), "7871234567");
  }

  #[test]
  fn ragged_csv_rows_are_tolerated() {
    let csv = b"a,b,c\nd\ne,f\n";
    let sheet = read_sheet_bytes(csv, "csv").unwrap();
    assert_eq!(sheet.len(), 3);
    assert_eq!(sheet.cell(1, 0), "d");
    assert_eq!(sheet.cell(1, 2), "");
  }

  #[test]
  fn unknown_extension_is_rejected() {
    let err = read_sheet_bytes(b"", "pdf").unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
  }

  #[test]
  fn empty_csv_is_rejected() {
    let err = read_sheet_bytes(b"", "csv").unwrap_err();
    assert!(matches!(err, Error::EmptySheet));
  }
}
