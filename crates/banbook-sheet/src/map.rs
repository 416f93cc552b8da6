//! Column mapper.
//!
//! Maps semantic fields to column indices by case-insensitive substring
//! precedence rules against the header row. Every field also carries a
//! positional default from the canonical activation-sheet layout; a field
//! that degrades to its default is recorded as such so callers can refuse
//! it (strict mode) or log it (lenient mode) instead of silently importing
//! the wrong column.

use crate::{Error, Result};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Semantic columns required from an activation sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetField {
  Phone,
  Plan,
  Price,
  Months,
  Notes,
}

impl SheetField {
  pub const ALL: [SheetField; 5] = [
    SheetField::Phone,
    SheetField::Plan,
    SheetField::Price,
    SheetField::Months,
    SheetField::Notes,
  ];

  pub fn name(self) -> &'static str {
    match self {
      SheetField::Phone => "phone",
      SheetField::Plan => "plan",
      SheetField::Price => "price",
      SheetField::Months => "months",
      SheetField::Notes => "notes",
    }
  }

  /// Column index used when no header cell matches the field's keywords.
  pub fn default_index(self) -> usize {
    match self {
      SheetField::Phone => 0,
      SheetField::Plan => 6,
      SheetField::Price => 7,
      SheetField::Months => 13,
      SheetField::Notes => 15,
    }
  }

  /// Keyword precedence rules, applied to the uppercased header cell.
  fn matches(self, upper: &str) -> bool {
    match self {
      SheetField::Phone => {
        upper.contains("CELULAR")
          || upper.contains("TELEFONO")
          || upper.contains("PHONE")
      }
      SheetField::Plan => {
        upper == "PLAN"
          || (upper.contains("PLAN")
            && !upper.contains("DATA")
            && !upper.contains("PRECIO"))
      }
      SheetField::Price => {
        // "PRECIO DE VENTA" is the sale price, never the monthly plan price.
        if upper.contains("PRECIO DE VENTA") {
          return false;
        }
        (upper.contains("PRECIO")
          && upper.contains("PLAN")
          && !upper.contains("DATA"))
          || upper.contains("VALOR")
          || upper.contains("RENTA")
      }
      SheetField::Months => upper.contains("MESES"),
      SheetField::Notes => {
        upper.contains("COMENTARIOS") || upper.contains("NOTAS")
      }
    }
  }
}

// ─── Mapping result ──────────────────────────────────────────────────────────

/// How a field's column index was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrigin {
  /// A header cell matched the field's keyword rules.
  Keyword {
    /// The matched header text, for diagnostics.
    header: String,
  },
  /// No header cell matched; the canonical positional default was used.
  Positional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
  pub index:  usize,
  pub origin: ColumnOrigin,
}

/// Field → column assignment for one sheet.
#[derive(Debug, Clone)]
pub struct ColumnMap {
  columns: [MappedColumn; 5],
}

impl ColumnMap {
  pub fn get(&self, field: SheetField) -> &MappedColumn {
    &self.columns[field_slot(field)]
  }

  pub fn index(&self, field: SheetField) -> usize {
    self.get(field).index
  }

  /// Fields that fell back to a positional default.
  pub fn positional_fields(&self) -> Vec<SheetField> {
    SheetField::ALL
      .into_iter()
      .filter(|f| self.get(*f).origin == ColumnOrigin::Positional)
      .collect()
  }

  /// Strict-mode gate: error unless every field was keyword-matched.
  pub fn require_keyword_matches(&self) -> Result<()> {
    let degraded: Vec<&'static str> = self
      .positional_fields()
      .into_iter()
      .map(SheetField::name)
      .collect();
    if degraded.is_empty() {
      Ok(())
    } else {
      Err(Error::PositionalFallback { fields: degraded })
    }
  }
}

fn field_slot(field: SheetField) -> usize {
  match field {
    SheetField::Phone => 0,
    SheetField::Plan => 1,
    SheetField::Price => 2,
    SheetField::Months => 3,
    SheetField::Notes => 4,
  }
}

/// Map every semantic field against `headers`. Never fails; strictness is
/// enforced separately via [`ColumnMap::require_keyword_matches`].
pub fn map_columns(headers: &[String]) -> ColumnMap {
  let columns = SheetField::ALL.map(|field| {
    let hit = headers
      .iter()
      .enumerate()
      .find(|(_, h)| field.matches(&h.to_uppercase()));

    match hit {
      Some((index, header)) => MappedColumn {
        index,
        origin: ColumnOrigin::Keyword { header: header.clone() },
      },
      None => MappedColumn {
        index:  field.default_index(),
        origin: ColumnOrigin::Positional,
      },
    }
  });

  ColumnMap { columns }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn headers(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
  }

  #[test]
  fn maps_activation_headers_by_keyword() {
    let h = headers(&[
      "#",
      "CELULAR",
      "NOMBRE",
      "PLAN",
      "PRECIO PLAN",
      "MESES CONTRATO",
      "COMENTARIOS",
    ]);
    let map = map_columns(&h);
    assert_eq!(map.index(SheetField::Phone), 1);
    assert_eq!(map.index(SheetField::Plan), 3);
    assert_eq!(map.index(SheetField::Price), 4);
    assert_eq!(map.index(SheetField::Months), 5);
    assert_eq!(map.index(SheetField::Notes), 6);
    assert!(map.require_keyword_matches().is_ok());
  }

  #[test]
  fn plan_keyword_rejects_data_and_price_columns() {
    let h = headers(&["PLAN DATA", "PRECIO PLAN", "PLAN"]);
    let map = map_columns(&h);
    assert_eq!(map.index(SheetField::Plan), 2);
  }

  #[test]
  fn price_rejects_sale_price_but_accepts_renta() {
    let h = headers(&["PRECIO DE VENTA", "RENTA MENSUAL"]);
    let map = map_columns(&h);
    assert_eq!(map.index(SheetField::Price), 1);
    assert_eq!(
      map.get(SheetField::Price).origin,
      ColumnOrigin::Keyword { header: "RENTA MENSUAL".to_string() }
    );
  }

  #[test]
  fn price_accepts_precio_plan_combination() {
    let h = headers(&["PRECIO DE VENTA", "PRECIO DEL PLAN"]);
    assert_eq!(map_columns(&h).index(SheetField::Price), 1);
  }

  #[test]
  fn unmatched_fields_fall_back_to_positional_defaults() {
    let map = map_columns(&headers(&["TELEFONO"]));
    assert_eq!(map.index(SheetField::Phone), 0);
    assert_eq!(map.index(SheetField::Plan), 6);
    assert_eq!(map.index(SheetField::Price), 7);
    assert_eq!(map.index(SheetField::Months), 13);
    assert_eq!(map.index(SheetField::Notes), 15);
  }

  #[test]
  fn strict_mode_names_degraded_fields() {
    let map = map_columns(&headers(&["TELEFONO", "PLAN"]));
    let err = map.require_keyword_matches().unwrap_err();
    match err {
      Error::PositionalFallback { fields } => {
        assert_eq!(fields, vec!["price", "months", "notes"]);
      }
      other => panic!("unexpected error: {other}"),
    }
  }
}
